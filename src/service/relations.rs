//! Relation queries. Plain reads; no merger involved.

use std::collections::HashSet;

use crate::error_handling::ServiceError;
use crate::models::RecordId;

use super::RecordService;

impl RecordService {
    /// Records `id` points at with a different bibliographic id.
    pub async fn parents(&self, id: &RecordId) -> Result<HashSet<RecordId>, ServiceError> {
        let _watch = self.stopwatch("parents");
        let mut dao = self.begin("parents").await?;
        let result = dao.relations_parents(id).await.map_err(ServiceError::from);
        self.finish("parents", dao, result).await
    }

    /// Records with a different bibliographic id pointing at `id`.
    pub async fn children(&self, id: &RecordId) -> Result<HashSet<RecordId>, ServiceError> {
        let _watch = self.stopwatch("children");
        let mut dao = self.begin("children").await?;
        let result = dao.relations_children(id).await.map_err(ServiceError::from);
        self.finish("children", dao, result).await
    }

    /// Records with the same bibliographic id that `id` overlays.
    pub async fn siblings_from_me(&self, id: &RecordId) -> Result<HashSet<RecordId>, ServiceError> {
        let _watch = self.stopwatch("siblings_from_me");
        let mut dao = self.begin("siblings_from_me").await?;
        let result = dao
            .relations_siblings_from_me(id)
            .await
            .map_err(ServiceError::from);
        self.finish("siblings_from_me", dao, result).await
    }

    /// Records with the same bibliographic id overlaying `id`.
    pub async fn siblings_to_me(&self, id: &RecordId) -> Result<HashSet<RecordId>, ServiceError> {
        let _watch = self.stopwatch("siblings_to_me");
        let mut dao = self.begin("siblings_to_me").await?;
        let result = dao
            .relations_siblings_to_me(id)
            .await
            .map_err(ServiceError::from);
        self.finish("siblings_to_me", dao, result).await
    }

    /// Every relation leaving `id`.
    pub async fn relations_from(&self, id: &RecordId) -> Result<HashSet<RecordId>, ServiceError> {
        let _watch = self.stopwatch("relations_from");
        let mut dao = self.begin("relations_from").await?;
        let result = dao.relations_from(id).await.map_err(ServiceError::from);
        self.finish("relations_from", dao, result).await
    }

    /// Agencies holding a live record for `bibliographic_record_id`.
    pub async fn all_agencies_for(
        &self,
        bibliographic_record_id: &str,
    ) -> Result<HashSet<i32>, ServiceError> {
        let _watch = self.stopwatch("all_agencies_for");
        let mut dao = self.begin("all_agencies_for").await?;
        let result = dao
            .all_agencies_for_bibliographic_record_id(bibliographic_record_id)
            .await
            .map_err(ServiceError::from);
        self.finish("all_agencies_for", dao, result).await
    }
}
