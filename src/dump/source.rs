//! Per-record content resolution for dumps.

use crate::error_handling::{DumpError, StoreError};
use crate::marc::{LineFormatWriter, RecordCodec};
use crate::merger::MarcMerger;
use crate::models::RecordId;
use crate::storage::RecordDao;

use super::types::{DumpMode, DumpParams, OutputFormat, RecordItem};

/// Resolves and serializes one record.
///
/// Only records the agency holds live are dumped; `Ok(None)` marks the rest
/// as skipped rather than failed.
pub(crate) async fn decoded_content(
    dao: &mut dyn RecordDao,
    codec: &dyn RecordCodec,
    id: &RecordId,
    params: DumpParams,
    merger: Option<&mut MarcMerger>,
) -> Result<Option<RecordItem>, DumpError> {
    let resolve_error = |source: StoreError| DumpError::Resolve {
        id: id.clone(),
        source,
    };
    if !dao.record_exists(id, false).await.map_err(resolve_error)? {
        return Ok(None);
    }
    let record = match (params.mode, merger) {
        (DumpMode::Merged, Some(merger)) => dao
            .fetch_merged_record(id, merger, false)
            .await
            .map_err(resolve_error)?,
        _ => dao.fetch_record(id).await.map_err(resolve_error)?,
    };
    if !record.has_content() {
        return Ok(None);
    }

    let decoded = codec
        .decode(&record.content)
        .map_err(|source| DumpError::Decode {
            id: id.clone(),
            source,
        })?;
    let local = match params.output_format {
        OutputFormat::Line => LineFormatWriter.write(&decoded),
        OutputFormat::Json => {
            let mut bytes = codec.encode(&decoded).map_err(|source| DumpError::Decode {
                id: id.clone(),
                source,
            })?;
            bytes.push(b'\n');
            bytes
        }
    };

    Ok(Some(RecordItem {
        id: id.clone(),
        local,
    }))
}
