//! Record storage.
//!
//! The service talks to storage only through `RawRecordStore` and
//! `RecordDao`. One `RecordDao` is one unit of work: the service commits it
//! when an operation succeeds and rolls it back when it fails.
//!
//! `SqliteRecordStore` is the reference implementation on sqlx/SQLite.

pub mod migrations;
pub mod pool;
mod sqlite;

#[cfg(test)]
pub(crate) mod test_helpers;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::error_handling::StoreError;
use crate::merger::MarcMerger;
use crate::models::{Record, RecordId};

// Re-export commonly used items
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteRecordStore;

/// Records keyed by bibliographic record id, all resolved for one agency.
pub type RecordCollection = HashMap<String, Record>;

/// Opens units of work against the record store.
#[async_trait]
pub trait RawRecordStore: Send + Sync {
    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Box<dyn RecordDao>, StoreError>;
}

/// Reads available inside one unit of work.
///
/// Absent slots are not errors here: `fetch_record` and the merged fetches
/// return a record with empty content, and callers decide what that means.
#[async_trait]
pub trait RecordDao: Send {
    /// Whether the slot holds a record; deleted records count only when `include_deleted`.
    async fn record_exists(&mut self, id: &RecordId, include_deleted: bool)
        -> Result<bool, StoreError>;

    /// The stored record, verbatim.
    async fn fetch_record(&mut self, id: &RecordId) -> Result<Record, StoreError>;

    /// The record with common content overlaid by `merger`.
    async fn fetch_merged_record(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        allow_deleted: bool,
    ) -> Result<Record, StoreError>;

    /// The merged record with authority links expanded.
    async fn fetch_merged_record_expanded(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        allow_deleted: bool,
        keep_authority_fields: bool,
    ) -> Result<Record, StoreError>;

    /// The merged record plus the transitive closure of its parents.
    async fn fetch_record_collection(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
    ) -> Result<RecordCollection, StoreError>;

    /// Like `fetch_record_collection`, with every member expanded and,
    /// when `include_authority`, the linked authority records as members.
    async fn fetch_record_collection_expanded(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        include_authority: bool,
        keep_authority_fields: bool,
    ) -> Result<RecordCollection, StoreError>;

    /// Expands authority links in `record` in place.
    async fn expand_record(
        &mut self,
        record: &mut Record,
        keep_authority_fields: bool,
    ) -> Result<(), StoreError>;

    async fn relations_parents(&mut self, id: &RecordId) -> Result<HashSet<RecordId>, StoreError>;

    async fn relations_children(&mut self, id: &RecordId)
        -> Result<HashSet<RecordId>, StoreError>;

    async fn relations_siblings_from_me(
        &mut self,
        id: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError>;

    async fn relations_siblings_to_me(
        &mut self,
        id: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError>;

    async fn relations_from(&mut self, id: &RecordId) -> Result<HashSet<RecordId>, StoreError>;

    /// Agencies holding a live record for the bibliographic id.
    async fn all_agencies_for_bibliographic_record_id(
        &mut self,
        bibliographic_record_id: &str,
    ) -> Result<HashSet<i32>, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
