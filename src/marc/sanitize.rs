use super::MarcRecord;

/// Drops every field whose tag does not start with an ASCII digit.
///
/// Local fields (`s10`, `z98`, ...) are internal to the owning agency and
/// never leave the service when private fields are excluded. The leader is
/// kept as-is and field order is preserved.
pub fn remove_private_fields(record: &MarcRecord) -> MarcRecord {
    MarcRecord {
        leader: record.leader.clone(),
        fields: record
            .fields
            .iter()
            .filter(|f| f.tag().starts_with(|c: char| c.is_ascii_digit()))
            .cloned()
            .collect(),
    }
}
