//! Collection assembly: a record together with the closure of its parents.

use std::collections::HashSet;

use log::debug;

use crate::error_handling::{NotFoundReason, ServiceError};
use crate::marc::MarcRecord;
use crate::models::{is_marcxchange, RecordId};
use crate::storage::{RecordCollection, RecordDao};

use super::{RecordService, ResolveOptions};

impl RecordService {
    /// The record and its related records, keyed by bibliographic record id,
    /// with content re-encoded after optional sanitizing.
    ///
    /// A record that only exists deleted is returned alone when `allow_deleted`.
    ///
    /// # Errors
    ///
    /// `MergeConflict` when any member is not MARC exchange content.
    pub async fn fetch_collection(
        &self,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<RecordCollection, ServiceError> {
        let _watch = self.stopwatch("fetch_collection");
        let mut dao = self.begin("fetch_collection").await?;
        let result = async {
            let mut collection = self.assemble(dao.as_mut(), id, options).await?;
            for record in collection.values_mut() {
                let decoded = self.decode(record, options.strip_private)?;
                record.content = self.codec.encode(&decoded)?;
            }
            Ok::<_, ServiceError>(collection)
        }
        .await;
        self.finish("fetch_collection", dao, result).await
    }

    /// The decoded members of the collection.
    ///
    /// Members are deduplicated by structural equality: two members with the
    /// same leader and fields appear once. The set has no order.
    pub async fn fetch_collection_decoded(
        &self,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<HashSet<MarcRecord>, ServiceError> {
        let _watch = self.stopwatch("fetch_collection_decoded");
        let mut dao = self.begin("fetch_collection_decoded").await?;
        let result = async {
            let collection = self.assemble(dao.as_mut(), id, options).await?;
            collection
                .values()
                .map(|record| self.decode(record, options.strip_private))
                .collect::<Result<HashSet<_>, _>>()
        }
        .await;
        self.finish("fetch_collection_decoded", dao, result).await
    }

    async fn assemble(
        &self,
        dao: &mut dyn RecordDao,
        id: &RecordId,
        options: ResolveOptions,
    ) -> Result<RecordCollection, ServiceError> {
        let deleted_only = options.allow_deleted
            && !dao.record_exists(id, false).await?
            && dao.record_exists(id, true).await?;

        let collection = if deleted_only {
            debug!("{id} exists only deleted; skipping relations");
            let record = dao.fetch_record(id).await?;
            RecordCollection::from([(id.bibliographic_record_id.clone(), record)])
        } else {
            let mut merger = self.mergers.checkout(options.use_parent_overlay).await?;
            let fetched = if options.expand {
                dao.fetch_record_collection_expanded(
                    id,
                    &mut merger,
                    true,
                    options.keep_authority_fields,
                )
                .await
            } else {
                dao.fetch_record_collection(id, &mut merger).await
            };
            merger.release();
            fetched?
        };

        if collection.is_empty() {
            return Err(ServiceError::not_found(id, NotFoundReason::EmptyContent));
        }
        if let Some(record) = collection.values().find(|r| !is_marcxchange(&r.mime_type)) {
            return Err(ServiceError::MergeConflict {
                id: record.id.clone(),
                mime_type: record.mime_type.clone(),
            });
        }
        debug!("Assembled collection of {} records for {id}", collection.len());
        Ok(collection)
    }
}
