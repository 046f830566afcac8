//! Exchange-format codecs.

use crate::error_handling::CodecError;

use super::MarcRecord;

/// Converts between stored content bytes and decoded records.
///
/// Implementations must fail with `CodecError::Decode` on malformed input
/// rather than producing a partial record.
pub trait RecordCodec: Send + Sync {
    fn decode(&self, content: &[u8]) -> Result<MarcRecord, CodecError>;

    fn encode(&self, record: &MarcRecord) -> Result<Vec<u8>, CodecError>;
}

/// JSON exchange codec: a record is `{"leader": "...", "fields": [...]}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRecordCodec;

impl RecordCodec for JsonRecordCodec {
    fn decode(&self, content: &[u8]) -> Result<MarcRecord, CodecError> {
        serde_json::from_slice(content).map_err(|e| CodecError::Decode(e.to_string()))
    }

    fn encode(&self, record: &MarcRecord) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(record).map_err(|e| CodecError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marc::{ControlField, DataField, Field, Leader};

    #[test]
    fn test_decode_known_document() {
        let json = br#"{
            "leader": "00000n    2200000   4500",
            "fields": [
                {"kind": "control", "tag": "008", "data": "fixed"},
                {"kind": "data", "tag": "245", "ind1": "0", "ind2": "0",
                 "subfields": [{"code": "a", "data": "Title"}]}
            ]
        }"#;
        let record = JsonRecordCodec.decode(json).expect("decodes");
        assert_eq!(record.leader.data(), "00000n    2200000   4500");
        assert_eq!(record.fields.len(), 2);
        assert!(matches!(record.fields[0], Field::Control(_)));
        assert_eq!(
            record.data_field("245").and_then(|f| f.subfield('a')),
            Some("Title")
        );
    }

    #[test]
    fn test_encode_preserves_control_fields() {
        let record = MarcRecord::new(Leader("L".to_string()))
            .with_field(ControlField {
                tag: "008".to_string(),
                data: "abc".to_string(),
            })
            .with_field(DataField::new("245").with_subfield('a', "T"));
        let bytes = JsonRecordCodec.encode(&record).expect("encodes");
        assert_eq!(JsonRecordCodec.decode(&bytes).expect("decodes"), record);
    }

    #[test]
    fn test_malformed_input_is_decode_error() {
        let err = JsonRecordCodec.decode(b"<record>not json</record>").unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
        assert!(JsonRecordCodec.decode(b"").is_err());
    }
}
