//! Authority link expansion.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::{AUTHORITY_AGENCY_SUBFIELD, AUTHORITY_ID_SUBFIELD};
use crate::error_handling::StoreError;
use crate::marc::{DataField, Field, MarcRecord, SubField};
use crate::models::{Record, RecordId};

use super::SqliteDao;

fn is_link_code(code: char) -> bool {
    code == AUTHORITY_AGENCY_SUBFIELD || code == AUTHORITY_ID_SUBFIELD
}

/// Tag of the authority main entry for a linked field (`700` → `100`).
fn main_entry_tag(tag: &str) -> Option<String> {
    match tag.chars().next() {
        Some('1' | '6' | '7') if tag.len() == 3 => Some(format!("1{}", &tag[1..])),
        _ => None,
    }
}

fn authority_link(field: &DataField) -> Option<RecordId> {
    let agency = field.subfield(AUTHORITY_AGENCY_SUBFIELD)?;
    let id = field.subfield(AUTHORITY_ID_SUBFIELD)?;
    match agency.trim().parse::<i32>() {
        Ok(agency) => Some(RecordId::new(id.trim(), agency)),
        Err(_) => {
            warn!("Ignoring authority link with agency '{agency}' in field {}", field.tag);
            None
        }
    }
}

/// Rewrites `field` from the authority main entry.
///
/// Authority subfields come first, then local subfields the entry does not
/// carry, then the link itself when it is kept.
fn expand_field(field: &mut DataField, entry: &DataField, keep_authority_fields: bool) {
    let mut subfields: Vec<SubField> = entry
        .subfields
        .iter()
        .filter(|s| !is_link_code(s.code))
        .cloned()
        .collect();
    subfields.extend(
        field
            .subfields
            .iter()
            .filter(|s| !is_link_code(s.code) && entry.subfield(s.code).is_none())
            .cloned(),
    );
    if keep_authority_fields {
        subfields.extend(field.subfields.iter().filter(|s| is_link_code(s.code)).cloned());
    }
    field.subfields = subfields;
}

impl SqliteDao {
    async fn authority_record(&mut self, id: &RecordId) -> Result<MarcRecord, StoreError> {
        if !self.exists(id, false).await? {
            return Err(StoreError::Backend(format!(
                "authority record {id} does not exist or is deleted"
            )));
        }
        let record = self.fetch(id).await?;
        self.decode(&record)
    }

    pub(super) async fn expand(
        &mut self,
        record: &mut Record,
        keep_authority_fields: bool,
    ) -> Result<(), StoreError> {
        if !record.has_content() {
            return Ok(());
        }
        let mut marc = self.decode(record)?;
        let mut authorities: HashMap<RecordId, MarcRecord> = HashMap::new();
        let mut expanded = 0usize;

        for field in marc.fields.iter_mut() {
            let Field::Data(field) = field else {
                continue;
            };
            let Some(link) = authority_link(field) else {
                continue;
            };
            if !authorities.contains_key(&link) {
                let authority = self.authority_record(&link).await?;
                authorities.insert(link.clone(), authority);
            }
            let Some(authority) = authorities.get(&link) else {
                continue;
            };

            let entry = main_entry_tag(&field.tag)
                .and_then(|tag| authority.data_field(&tag))
                .or_else(|| authority.data_fields().find(|f| f.tag.starts_with('1')));
            match entry {
                Some(entry) => {
                    expand_field(field, entry, keep_authority_fields);
                    expanded += 1;
                }
                None => warn!("Authority record {link} has no main entry for field {}", field.tag),
            }
        }

        if expanded > 0 {
            record.content = self.encode(&record.id, &marc)?;
            debug!("Expanded {expanded} authority links in {}", record.id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_field() -> DataField {
        DataField::new("700")
            .with_subfield('5', "870979")
            .with_subfield('6', "68000001")
            .with_subfield('4', "aut")
    }

    fn entry() -> DataField {
        DataField::new("100")
            .with_subfield('a', "Andersen")
            .with_subfield('h', "H.C.")
    }

    #[test]
    fn test_main_entry_tag() {
        assert_eq!(main_entry_tag("700").as_deref(), Some("100"));
        assert_eq!(main_entry_tag("610").as_deref(), Some("110"));
        assert_eq!(main_entry_tag("100").as_deref(), Some("100"));
        assert_eq!(main_entry_tag("245"), None);
        assert_eq!(main_entry_tag("7"), None);
    }

    #[test]
    fn test_authority_link_parsing() {
        assert_eq!(
            authority_link(&linked_field()),
            Some(RecordId::new("68000001", 870979))
        );
        let bad = DataField::new("700")
            .with_subfield('5', "not-a-number")
            .with_subfield('6', "x");
        assert_eq!(authority_link(&bad), None);
        assert_eq!(authority_link(&DataField::new("700").with_subfield('6', "x")), None);
    }

    #[test]
    fn test_expand_field_drops_link_by_default() {
        let mut field = linked_field();
        expand_field(&mut field, &entry(), false);
        let codes: Vec<char> = field.subfields.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec!['a', 'h', '4']);
        assert_eq!(field.tag, "700");
    }

    #[test]
    fn test_expand_field_keeps_link_when_asked() {
        let mut field = linked_field();
        expand_field(&mut field, &entry(), true);
        let codes: Vec<char> = field.subfields.iter().map(|s| s.code).collect();
        assert_eq!(codes, vec!['a', 'h', '4', '5', '6']);
    }
}
