//! Transport representations of records.
//!
//! Serialized with camelCase keys for the enclosing service's JSON surface.

use std::collections::HashSet;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error_handling::CodecError;
use crate::marc::{DataField, Field, MarcRecord, RecordCodec};
use crate::models::{Record, RecordId};
use crate::storage::RecordCollection;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdDto {
    pub bibliographic_record_id: String,
    pub agency_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIdCollectionDto {
    pub record_ids: Vec<RecordIdDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubfieldDto {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDto {
    pub name: String,
    pub indicators: String,
    pub subfields: Vec<SubfieldDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDto {
    pub leader: String,
    pub fields: Vec<FieldDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMetaDataDto {
    pub record_id: RecordIdDto,
    pub deleted: bool,
    pub created: String,
    pub modified: String,
    pub mimetype: String,
    pub tracking_id: String,
    pub enrichment_trail: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordDto {
    pub record_id: RecordIdDto,
    pub deleted: bool,
    pub created: String,
    pub modified: String,
    pub mimetype: String,
    pub tracking_id: String,
    pub enrichment_trail: String,
    /// Stored content bytes, standard base64; `None` for records without content.
    pub content: Option<String>,
    #[serde(rename = "contentJSON")]
    pub content_json: Option<ContentDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordCollectionDto {
    pub records: Vec<RecordDto>,
}

impl From<&RecordId> for RecordIdDto {
    fn from(id: &RecordId) -> Self {
        RecordIdDto {
            bibliographic_record_id: id.bibliographic_record_id.clone(),
            agency_id: id.agency_id,
        }
    }
}

impl From<&Record> for RecordMetaDataDto {
    fn from(record: &Record) -> Self {
        RecordMetaDataDto {
            record_id: RecordIdDto::from(&record.id),
            deleted: record.deleted,
            created: record.created.to_rfc3339(),
            modified: record.modified.to_rfc3339(),
            mimetype: record.mime_type.clone(),
            tracking_id: record.tracking_id.clone(),
            enrichment_trail: record.enrichment_trail.clone(),
        }
    }
}

/// `ind1` and `ind2` default to a blank; `ind3` is appended only when present.
fn indicators(field: &DataField) -> String {
    let mut indicators = String::with_capacity(3);
    indicators.push(field.ind1.unwrap_or(' '));
    indicators.push(field.ind2.unwrap_or(' '));
    if let Some(ind3) = field.ind3 {
        indicators.push(ind3);
    }
    indicators
}

/// Maps the data fields of `record`; other field kinds are not represented.
pub fn content_to_dto(record: &MarcRecord) -> ContentDto {
    let fields = record
        .fields
        .iter()
        .filter_map(|field| match field {
            Field::Data(data) => Some(FieldDto {
                name: data.tag.clone(),
                indicators: indicators(data),
                subfields: data
                    .subfields
                    .iter()
                    .map(|s| SubfieldDto {
                        name: s.code.to_string(),
                        value: s.data.clone(),
                    })
                    .collect(),
            }),
            Field::Control(_) => None,
        })
        .collect();

    ContentDto {
        leader: record.leader.data().to_string(),
        fields,
    }
}

/// Maps a record, decoding its content for the structured view.
///
/// # Errors
///
/// Returns the codec error if non-empty content cannot be decoded.
pub fn record_to_dto(record: &Record, codec: &dyn RecordCodec) -> Result<RecordDto, CodecError> {
    let (content, content_json) = if record.has_content() {
        let decoded = codec.decode(&record.content)?;
        (
            Some(STANDARD.encode(&record.content)),
            Some(content_to_dto(&decoded)),
        )
    } else {
        (None, None)
    };

    let meta = RecordMetaDataDto::from(record);
    Ok(RecordDto {
        record_id: meta.record_id,
        deleted: meta.deleted,
        created: meta.created,
        modified: meta.modified,
        mimetype: meta.mimetype,
        tracking_id: meta.tracking_id,
        enrichment_trail: meta.enrichment_trail,
        content,
        content_json,
    })
}

pub fn record_collection_to_dto(
    collection: &RecordCollection,
    codec: &dyn RecordCodec,
) -> Result<RecordCollectionDto, CodecError> {
    let mut records = collection
        .values()
        .map(|record| record_to_dto(record, codec))
        .collect::<Result<Vec<_>, _>>()?;
    records.sort_by(|a, b| {
        a.record_id
            .bibliographic_record_id
            .cmp(&b.record_id.bibliographic_record_id)
    });
    Ok(RecordCollectionDto { records })
}

pub fn record_ids_to_dto(ids: &HashSet<RecordId>) -> RecordIdCollectionDto {
    let mut sorted: Vec<&RecordId> = ids.iter().collect();
    sorted.sort();
    RecordIdCollectionDto {
        record_ids: sorted.into_iter().map(RecordIdDto::from).collect(),
    }
}
