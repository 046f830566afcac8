//! The record service.
//!
//! `RecordService` is the public face of the crate. Every operation runs as
//! one unit of work against the injected store:
//!
//! 1. `begin()` opens the unit of work
//! 2. the operation body runs against it
//! 3. `finish()` commits on success, or rolls back, logs and counts the failure
//!
//! `finish()` is the only place where failures are logged and counted, so
//! each failure is reported exactly once.

mod collection;
mod relations;
mod resolver;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};

use crate::config::Config;
use crate::error_handling::{ServiceError, ServiceStats};
use crate::marc::{JsonRecordCodec, RecordCodec};
use crate::merger::{MergerPools, StaticRelationHints};
use crate::storage::{RawRecordStore, RecordDao, SqliteRecordStore};
use crate::utils::{Stopwatch, TimingStats};

pub use resolver::ResolveOptions;

/// Resolves effective record content, collections and relations.
///
/// Cheap to clone; clones share the store, the merger pools and the statistics.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RawRecordStore>,
    codec: Arc<dyn RecordCodec>,
    mergers: Arc<MergerPools>,
    stats: Arc<ServiceStats>,
    timings: Arc<TimingStats>,
    sqlite: Option<SqliteRecordStore>,
}

impl RecordService {
    /// Builds a service over an injected store.
    pub fn new(
        store: Arc<dyn RawRecordStore>,
        codec: Arc<dyn RecordCodec>,
        mergers: MergerPools,
    ) -> Self {
        RecordService {
            store,
            codec,
            mergers: Arc::new(mergers),
            stats: Arc::new(ServiceStats::new()),
            timings: Arc::new(TimingStats::new()),
            sqlite: None,
        }
    }

    /// Builds the service with the SQLite reference store, the JSON codec and
    /// merger pools sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the database cannot be opened.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate().context("Invalid service configuration")?;

        let codec: Arc<dyn RecordCodec> = Arc::new(JsonRecordCodec);
        let store = SqliteRecordStore::open(
            &config.db_path,
            config.max_db_connections,
            Duration::from_secs(config.db_acquire_timeout_secs),
            Arc::clone(&codec),
            Arc::new(StaticRelationHints::from_config(config)),
            config.authority_agency,
        )
        .await
        .with_context(|| format!("Failed to open record store at {}", config.db_path.display()))?;

        let mergers = MergerPools::new(
            config.default_merger_pool_size,
            config.parent_merger_pool_size,
        );
        info!(
            "Record service ready (merger pools: {} default, {} parent-agency)",
            config.default_merger_pool_size, config.parent_merger_pool_size
        );

        let mut service = Self::new(Arc::new(store.clone()), codec, mergers);
        service.sqlite = Some(store);
        Ok(service)
    }

    pub fn stats(&self) -> &Arc<ServiceStats> {
        &self.stats
    }

    pub fn timings(&self) -> &Arc<TimingStats> {
        &self.timings
    }

    pub fn mergers(&self) -> &Arc<MergerPools> {
        &self.mergers
    }

    pub fn codec(&self) -> &Arc<dyn RecordCodec> {
        &self.codec
    }

    pub(crate) fn store(&self) -> &Arc<dyn RawRecordStore> {
        &self.store
    }

    /// Closes the merger pools and, when the service owns it, the database pool.
    ///
    /// Operations started afterwards that need a merger fail with `InternalServer`.
    pub async fn shutdown(&self) {
        self.mergers.close();
        if let Some(store) = &self.sqlite {
            store.close().await;
        }
        self.timings.log_summary();
        info!(
            "Record service stopped ({} operations completed, {} failed)",
            self.stats.completed(),
            self.stats.total_errors()
        );
    }

    fn stopwatch(&self, operation: &'static str) -> Stopwatch {
        Stopwatch::recording(operation, &self.timings)
    }

    async fn begin(&self, operation: &'static str) -> Result<Box<dyn RecordDao>, ServiceError> {
        self.store
            .begin()
            .await
            .map_err(|e| self.report(operation, ServiceError::from(e)))
    }

    /// Commits on success; rolls back and reports on failure.
    async fn finish<T>(
        &self,
        operation: &'static str,
        dao: Box<dyn RecordDao>,
        result: Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        match result {
            Ok(value) => match dao.commit().await {
                Ok(()) => {
                    self.stats.increment_completed();
                    Ok(value)
                }
                Err(e) => Err(self.report(operation, e.into())),
            },
            Err(err) => {
                if let Err(rollback_err) = dao.rollback().await {
                    warn!("{operation}: rollback failed: {rollback_err}");
                }
                Err(self.report(operation, err))
            }
        }
    }

    fn report(&self, operation: &'static str, err: ServiceError) -> ServiceError {
        match &err {
            ServiceError::InternalServer(_) => error!("{operation} failed: {err}"),
            _ => debug!("{operation}: {err}"),
        }
        self.stats.increment_error(err.kind());
        err
    }
}
