//! Tests to ensure error messages are actionable and consistent
//!
//! Covers the messages of the caller-facing taxonomy, configuration
//! validation, and the rollback of a unit of work whose backend fails.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use rawrepo_record_service::error_handling::{ErrorKind, StoreError};
use rawrepo_record_service::merger::MarcMerger;
use rawrepo_record_service::{
    Config, JsonRecordCodec, MergerPools, NotFoundReason, RawRecordStore, Record,
    RecordCollection, RecordDao, RecordId, RecordService, ResolveOptions, ServiceError,
};

#[test]
fn test_not_found_messages_name_the_record() {
    let id = RecordId::new("12345678", 710100);
    let cases = [
        (NotFoundReason::Missing, "was not found"),
        (NotFoundReason::MissingOrDeleted, "was not found or is deleted"),
        (NotFoundReason::EmptyContent, "resolved to empty content"),
    ];
    for (reason, text) in cases {
        let message = ServiceError::not_found(&id, reason).to_string();
        assert!(message.contains("12345678"), "missing id in: {message}");
        assert!(message.contains("710100"), "missing agency in: {message}");
        assert!(message.ends_with(text), "unexpected message: {message}");
    }
}

#[test]
fn test_merge_conflict_names_the_mime_type() {
    let err = ServiceError::MergeConflict {
        id: RecordId::new("1", 870970),
        mime_type: "text/plain".to_string(),
    };
    assert!(err
        .to_string()
        .starts_with("Cannot make marcx:collection from mimetype: text/plain"));
    assert_eq!(err.kind(), ErrorKind::MergeConflict);
}

#[test]
fn test_internal_errors_keep_their_cause() {
    let err = ServiceError::from(StoreError::Backend("connection reset".to_string()));
    assert_eq!(err.kind(), ErrorKind::InternalServer);
    let message = err.to_string();
    assert!(message.starts_with("Internal server error"));
    assert!(message.contains("connection reset"));
}

#[test]
fn test_config_validation_errors_are_descriptive() {
    let config = Config {
        default_merger_pool_size: 0,
        ..Default::default()
    };
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("default_merger_pool_size"), "{message}");
    assert!(message.contains("between 1 and"), "{message}");

    let config = Config {
        dump_workers: 10_000,
        ..Default::default()
    };
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("dump_workers"), "{message}");
    assert!(message.contains("10000"), "{message}");

    let config = Config {
        common_agencies: Vec::new(),
        ..Default::default()
    };
    let message = config.validate().unwrap_err().to_string();
    assert!(message.contains("common_agencies"), "{message}");

    let config = Config {
        max_db_connections: 0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
    assert!(Config::default().validate().is_ok());
}

/// A store whose every read fails with a backend error.
#[derive(Default)]
struct BrokenStore {
    rolled_back: Arc<AtomicBool>,
    committed: Arc<AtomicUsize>,
}

struct BrokenDao {
    rolled_back: Arc<AtomicBool>,
    committed: Arc<AtomicUsize>,
}

fn broken<T>() -> Result<T, StoreError> {
    Err(StoreError::Backend("disk on fire".to_string()))
}

#[async_trait]
impl RawRecordStore for BrokenStore {
    async fn begin(&self) -> Result<Box<dyn RecordDao>, StoreError> {
        Ok(Box::new(BrokenDao {
            rolled_back: Arc::clone(&self.rolled_back),
            committed: Arc::clone(&self.committed),
        }))
    }
}

#[async_trait]
impl RecordDao for BrokenDao {
    async fn record_exists(&mut self, _: &RecordId, _: bool) -> Result<bool, StoreError> {
        broken()
    }

    async fn fetch_record(&mut self, _: &RecordId) -> Result<Record, StoreError> {
        broken()
    }

    async fn fetch_merged_record(
        &mut self,
        _: &RecordId,
        _: &mut MarcMerger,
        _: bool,
    ) -> Result<Record, StoreError> {
        broken()
    }

    async fn fetch_merged_record_expanded(
        &mut self,
        _: &RecordId,
        _: &mut MarcMerger,
        _: bool,
        _: bool,
    ) -> Result<Record, StoreError> {
        broken()
    }

    async fn fetch_record_collection(
        &mut self,
        _: &RecordId,
        _: &mut MarcMerger,
    ) -> Result<RecordCollection, StoreError> {
        broken()
    }

    async fn fetch_record_collection_expanded(
        &mut self,
        _: &RecordId,
        _: &mut MarcMerger,
        _: bool,
        _: bool,
    ) -> Result<RecordCollection, StoreError> {
        broken()
    }

    async fn expand_record(&mut self, _: &mut Record, _: bool) -> Result<(), StoreError> {
        broken()
    }

    async fn relations_parents(&mut self, _: &RecordId) -> Result<HashSet<RecordId>, StoreError> {
        broken()
    }

    async fn relations_children(&mut self, _: &RecordId) -> Result<HashSet<RecordId>, StoreError> {
        broken()
    }

    async fn relations_siblings_from_me(
        &mut self,
        _: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError> {
        broken()
    }

    async fn relations_siblings_to_me(
        &mut self,
        _: &RecordId,
    ) -> Result<HashSet<RecordId>, StoreError> {
        broken()
    }

    async fn relations_from(&mut self, _: &RecordId) -> Result<HashSet<RecordId>, StoreError> {
        broken()
    }

    async fn all_agencies_for_bibliographic_record_id(
        &mut self,
        _: &str,
    ) -> Result<HashSet<i32>, StoreError> {
        broken()
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.rolled_back.store(true, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_backend_failure_rolls_back_and_reports_internal_error() {
    let store = BrokenStore::default();
    let rolled_back = Arc::clone(&store.rolled_back);
    let committed = Arc::clone(&store.committed);
    let service = RecordService::new(Arc::new(store), Arc::new(JsonRecordCodec), MergerPools::new(1, 1));
    let id = RecordId::new("1", 870970);

    let err = service
        .fetch_resolved(&id, ResolveOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InternalServer(_)));
    assert!(err.to_string().contains("disk on fire"));
    assert!(rolled_back.load(Ordering::SeqCst));
    assert_eq!(committed.load(Ordering::SeqCst), 0);

    assert!(service.parents(&id).await.is_err());
    assert!(service.fetch_collection(&id, ResolveOptions::default()).await.is_err());
    assert_eq!(service.stats().get_error_count(ErrorKind::InternalServer), 3);
    assert_eq!(service.stats().completed(), 0);

    // the lease is returned even though the store failed mid-merge
    assert_eq!(
        service
            .mergers()
            .pool(rawrepo_record_service::MergerFlavor::Default)
            .idle_count(),
        1
    );
}
