//! Decoded MARC record model.
//!
//! This module provides:
//! - `MarcRecord`, `Field`, `DataField`, `ControlField`, `SubField`
//! - The `RecordCodec` trait and the default JSON exchange codec
//! - A line-format writer used for dumps
//! - Private field removal
//!
//! All types derive `Eq + Hash`: two records with the same leader and the
//! same fields in the same order are the same record.

mod codec;
mod line;
mod sanitize;

use serde::{Deserialize, Serialize};

pub use codec::{JsonRecordCodec, RecordCodec};
pub use line::LineFormatWriter;
pub use sanitize::remove_private_fields;

/// The fixed-length record header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leader(pub String);

impl Leader {
    pub fn data(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubField {
    pub code: char,
    pub data: String,
}

impl SubField {
    pub fn new(code: char, data: impl Into<String>) -> Self {
        SubField {
            code,
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataField {
    pub tag: String,
    pub ind1: Option<char>,
    pub ind2: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ind3: Option<char>,
    pub subfields: Vec<SubField>,
}

impl DataField {
    /// A data field with both standard indicators set to `'0'`.
    pub fn new(tag: impl Into<String>) -> Self {
        DataField {
            tag: tag.into(),
            ind1: Some('0'),
            ind2: Some('0'),
            ind3: None,
            subfields: Vec::new(),
        }
    }

    pub fn with_subfield(mut self, code: char, data: impl Into<String>) -> Self {
        self.subfields.push(SubField::new(code, data));
        self
    }

    /// First value of the given subfield code.
    pub fn subfield(&self, code: char) -> Option<&str> {
        self.subfields
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.data.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlField {
    pub tag: String,
    pub data: String,
}

/// A record field. Only data fields are interpreted; other kinds travel
/// through sanitizing, merging and codecs untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Field {
    Data(DataField),
    Control(ControlField),
}

impl Field {
    pub fn tag(&self) -> &str {
        match self {
            Field::Data(f) => &f.tag,
            Field::Control(f) => &f.tag,
        }
    }
}

impl From<DataField> for Field {
    fn from(f: DataField) -> Self {
        Field::Data(f)
    }
}

impl From<ControlField> for Field {
    fn from(f: ControlField) -> Self {
        Field::Control(f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarcRecord {
    pub leader: Leader,
    pub fields: Vec<Field>,
}

impl MarcRecord {
    pub fn new(leader: Leader) -> Self {
        MarcRecord {
            leader,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<Field>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn data_fields(&self) -> impl Iterator<Item = &DataField> {
        self.fields.iter().filter_map(|f| match f {
            Field::Data(d) => Some(d),
            Field::Control(_) => None,
        })
    }

    /// First data field carrying `tag`.
    pub fn data_field(&self, tag: &str) -> Option<&DataField> {
        self.data_fields().find(|f| f.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_subfield_lookup() {
        let field = DataField::new("245")
            .with_subfield('a', "Title")
            .with_subfield('a', "Second")
            .with_subfield('c', "Author");
        assert_eq!(field.subfield('a'), Some("Title"));
        assert_eq!(field.subfield('c'), Some("Author"));
        assert_eq!(field.subfield('z'), None);
    }

    #[test]
    fn test_structural_equality_collapses_in_set() {
        let make = || {
            MarcRecord::new(Leader("00000n    2200000   4500".to_string()))
                .with_field(DataField::new("001").with_subfield('a', "1"))
        };
        let mut set = HashSet::new();
        set.insert(make());
        set.insert(make());
        assert_eq!(set.len(), 1);

        set.insert(make().with_field(DataField::new("245").with_subfield('a', "T")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_data_fields_skips_control_fields() {
        let record = MarcRecord::default()
            .with_field(ControlField {
                tag: "008".to_string(),
                data: "xx".to_string(),
            })
            .with_field(DataField::new("245"));
        assert_eq!(record.data_fields().count(), 1);
        assert!(record.data_field("008").is_none());
        assert_eq!(record.fields[0].tag(), "008");
    }
}
