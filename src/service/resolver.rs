//! Single-record resolution.

use crate::error_handling::{NotFoundReason, ServiceError};
use crate::marc::{remove_private_fields, MarcRecord};
use crate::models::{Record, RecordId};
use crate::storage::RecordDao;

use super::RecordService;

/// Flags shared by the merged and collection operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Accept records that are marked deleted.
    pub allow_deleted: bool,
    /// Drop fields whose tag does not start with a digit.
    pub strip_private: bool,
    /// Merge with the parent-agency rules instead of the default ones.
    pub use_parent_overlay: bool,
    /// Inline linked authority records.
    pub expand: bool,
    /// Keep the authority link subfields after expansion.
    pub keep_authority_fields: bool,
}

impl RecordService {
    /// Whether `id` holds a record; deleted records count only when `include_deleted`.
    pub async fn exists(&self, id: &RecordId, include_deleted: bool) -> Result<bool, ServiceError> {
        let _watch = self.stopwatch("exists");
        let mut dao = self.begin("exists").await?;
        let result = dao
            .record_exists(id, include_deleted)
            .await
            .map_err(ServiceError::from);
        self.finish("exists", dao, result).await
    }

    /// The stored record, verbatim.
    ///
    /// # Errors
    ///
    /// `NotFound` when no record (or, without `allow_deleted`, no live record) exists.
    pub async fn fetch_raw(&self, id: &RecordId, allow_deleted: bool) -> Result<Record, ServiceError> {
        let _watch = self.stopwatch("fetch_raw");
        let mut dao = self.begin("fetch_raw").await?;
        let result = fetch_existing(dao.as_mut(), id, allow_deleted).await;
        self.finish("fetch_raw", dao, result).await
    }

    /// The stored record decoded, optionally without private fields.
    pub async fn fetch_decoded(
        &self,
        id: &RecordId,
        allow_deleted: bool,
        strip_private: bool,
    ) -> Result<MarcRecord, ServiceError> {
        let _watch = self.stopwatch("fetch_decoded");
        let mut dao = self.begin("fetch_decoded").await?;
        let result = async {
            let record = fetch_existing(dao.as_mut(), id, allow_deleted).await?;
            self.decode(&record, strip_private)
        }
        .await;
        self.finish("fetch_decoded", dao, result).await
    }

    /// The effective record: common content overlaid with the agency's own,
    /// optionally expanded and stripped of private fields.
    ///
    /// # Errors
    ///
    /// `NotFound` when resolution yields no content.
    pub async fn fetch_resolved(
        &self,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<Record, ServiceError> {
        let _watch = self.stopwatch("fetch_resolved");
        let mut dao = self.begin("fetch_resolved").await?;
        let result = self.resolve(dao.as_mut(), id, options).await;
        self.finish("fetch_resolved", dao, result).await
    }

    /// Like `fetch_resolved`, returning the decoded record.
    ///
    /// Expansion runs as a separate pass over the merged record.
    pub async fn fetch_resolved_decoded(
        &self,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<MarcRecord, ServiceError> {
        let _watch = self.stopwatch("fetch_resolved_decoded");
        let mut dao = self.begin("fetch_resolved_decoded").await?;
        let result = self.resolve_decoded(dao.as_mut(), id, options).await;
        self.finish("fetch_resolved_decoded", dao, result).await
    }

    async fn resolve(
        &self,
        dao: &mut dyn RecordDao,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<Record, ServiceError> {
        let mut record = {
            let mut merger = self.mergers.checkout(options.use_parent_overlay).await?;
            let fetched = if options.expand {
                dao.fetch_merged_record_expanded(
                    id,
                    &mut merger,
                    options.allow_deleted,
                    options.keep_authority_fields,
                )
                .await
            } else {
                dao.fetch_merged_record(id, &mut merger, options.allow_deleted)
                    .await
            };
            merger.release();
            fetched?
        };

        if !record.has_content() {
            return Err(ServiceError::not_found(id, NotFoundReason::EmptyContent));
        }
        let decoded = self.decode(&record, options.strip_private)?;
        record.content = self.codec.encode(&decoded)?;
        Ok(record)
    }

    async fn resolve_decoded(
        &self,
        dao: &mut dyn RecordDao,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<MarcRecord, ServiceError> {
        let mut record = {
            let mut merger = self.mergers.checkout(options.use_parent_overlay).await?;
            let fetched = dao
                .fetch_merged_record(id, &mut merger, options.allow_deleted)
                .await;
            merger.release();
            fetched?
        };

        if !record.has_content() {
            return Err(ServiceError::not_found(id, NotFoundReason::EmptyContent));
        }
        if options.expand {
            dao.expand_record(&mut record, options.keep_authority_fields)
                .await?;
        }
        self.decode(&record, options.strip_private)
    }

    pub(super) fn decode(&self, record: &Record, strip_private: bool) -> Result<MarcRecord, ServiceError> {
        let decoded = self.codec.decode(&record.content)?;
        Ok(if strip_private {
            remove_private_fields(&decoded)
        } else {
            decoded
        })
    }
}

/// Fetches `id` after checking it exists under the deletion policy.
pub(super) async fn fetch_existing(
    dao: &mut dyn RecordDao,
    id: &RecordId,
    allow_deleted: bool,
) -> Result<Record, ServiceError> {
    if !dao.record_exists(id, allow_deleted).await? {
        let reason = if allow_deleted {
            NotFoundReason::Missing
        } else {
            NotFoundReason::MissingOrDeleted
        };
        return Err(ServiceError::not_found(id, reason));
    }
    Ok(dao.fetch_record(id).await?)
}
