//! Record identity and stored record types.
//!
//! A `Record` is produced fresh for every call and handed to the caller; nothing
//! in this crate caches records across calls.

mod mime;

use std::fmt;

use chrono::{DateTime, Utc};

pub use mime::is_marcxchange;

/// Identifies one record slot: a bibliographic id as owned by one agency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    pub bibliographic_record_id: String,
    pub agency_id: i32,
}

impl RecordId {
    pub fn new(bibliographic_record_id: impl Into<String>, agency_id: i32) -> Self {
        RecordId {
            bibliographic_record_id: bibliographic_record_id.into(),
            agency_id,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.bibliographic_record_id, self.agency_id)
    }
}

/// A stored (or resolved) record with opaque exchange-format content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub content: Vec<u8>,
    pub mime_type: String,
    pub deleted: bool,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    pub tracking_id: String,
    /// Agencies whose content went into this record, base first (`870970,710100`)
    pub enrichment_trail: String,
}

impl Record {
    /// An empty record for a slot that holds nothing.
    ///
    /// Storage hands these out for absent slots; callers treat empty content as "not found".
    pub fn empty(id: RecordId) -> Self {
        let now = Utc::now();
        Record {
            enrichment_trail: id.agency_id.to_string(),
            id,
            content: Vec::new(),
            mime_type: crate::config::MIMETYPE_MARCXCHANGE.to_string(),
            deleted: false,
            created: now,
            modified: now,
            tracking_id: String::new(),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }
}
