use std::collections::HashSet;

use async_trait::async_trait;

use crate::error_handling::StoreError;
use crate::merger::MarcMerger;
use crate::models::{Record, RecordId};
use crate::storage::{RecordCollection, RecordDao};

use super::SqliteDao;

#[async_trait]
impl RecordDao for SqliteDao {
    async fn record_exists(
        &mut self,
        id: &RecordId,
        include_deleted: bool,
    ) -> Result<bool, StoreError> {
        self.exists(id, include_deleted).await
    }

    async fn fetch_record(&mut self, id: &RecordId) -> Result<Record, StoreError> {
        self.fetch(id).await
    }

    async fn fetch_merged_record(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        allow_deleted: bool,
    ) -> Result<Record, StoreError> {
        self.merged(id, merger, allow_deleted).await
    }

    async fn fetch_merged_record_expanded(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        allow_deleted: bool,
        keep_authority_fields: bool,
    ) -> Result<Record, StoreError> {
        let mut record = self.merged(id, merger, allow_deleted).await?;
        self.expand(&mut record, keep_authority_fields).await?;
        Ok(record)
    }

    async fn fetch_record_collection(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
    ) -> Result<RecordCollection, StoreError> {
        self.collection(id, merger, None, false).await
    }

    async fn fetch_record_collection_expanded(
        &mut self,
        id: &RecordId,
        merger: &mut MarcMerger,
        include_authority: bool,
        keep_authority_fields: bool,
    ) -> Result<RecordCollection, StoreError> {
        self.collection(id, merger, Some(keep_authority_fields), include_authority)
            .await
    }

    async fn expand_record(
        &mut self,
        record: &mut Record,
        keep_authority_fields: bool,
    ) -> Result<(), StoreError> {
        self.expand(record, keep_authority_fields).await
    }

    async fn relations_parents(&mut self, id: &RecordId) -> Result<HashSet<RecordId>, StoreError> {
        self.outgoing(id, Some(false)).await
    }

    async fn relations_children(
        &mut self,
        id: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError> {
        self.incoming(id, false).await
    }

    async fn relations_siblings_from_me(
        &mut self,
        id: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError> {
        self.outgoing(id, Some(true)).await
    }

    async fn relations_siblings_to_me(
        &mut self,
        id: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError> {
        self.incoming(id, true).await
    }

    async fn relations_from(&mut self, id: &RecordId) -> Result<HashSet<RecordId>, StoreError> {
        self.outgoing(id, None).await
    }

    async fn all_agencies_for_bibliographic_record_id(
        &mut self,
        bibliographic_record_id: &str,
    ) -> Result<HashSet<i32>, StoreError> {
        self.agencies_for(bibliographic_record_id).await
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
