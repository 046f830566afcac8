//! Bulk dump pipeline.
//!
//! This module provides:
//! - `DumpPipeline`, which splits a batch of bibliographic ids across workers
//! - `RecordByteWriter`, the sink all workers append to
//! - `DumpParams`, `DumpReport` and related types
//!
//! Workers run in parallel and never cancel each other. A failing worker
//! stops its own sub-batch and is reported in the `DumpReport`; whatever the
//! other workers resolve is still written.

mod sink;
mod source;
mod types;
mod worker;

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use log::{error, info};
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error_handling::{DumpError, ErrorKind};
use crate::service::RecordService;

pub use sink::RecordByteWriter;
pub use types::{DumpMode, DumpParams, DumpReport, OutputFormat, RecordItem, WorkerOutcome};

use worker::DumpWorker;

/// Splits sorted ids into contiguous chunks of `ceil(n / workers)`.
pub fn partition(mut ids: Vec<String>, workers: usize) -> Vec<Vec<String>> {
    ids.sort();
    ids.dedup();
    if ids.is_empty() {
        return Vec::new();
    }
    let chunk_size = ids.len().div_ceil(workers.max(1));
    ids.chunks(chunk_size).map(<[String]>::to_vec).collect()
}

/// Dumps records of one agency through a fixed number of workers.
///
/// A worker holds one database connection for its whole sub-batch, so at
/// most `connection_limit` workers run at once; the rest wait their turn
/// instead of timing out on the connection pool.
pub struct DumpPipeline {
    service: RecordService,
    workers: usize,
    connection_limit: usize,
}

impl DumpPipeline {
    pub fn new(service: RecordService, workers: usize) -> Self {
        let workers = workers.max(1);
        DumpPipeline {
            service,
            workers,
            connection_limit: workers,
        }
    }

    /// Caps how many workers hold a unit of work at the same time.
    pub fn with_connection_limit(mut self, limit: usize) -> Self {
        self.connection_limit = limit.max(1);
        self
    }

    pub fn from_config(service: RecordService, config: &Config) -> Self {
        Self::new(service, config.dump_workers)
            .with_connection_limit(config.max_db_connections as usize)
    }

    /// Writes the records of `agency_id` named by `ids` to `sink`.
    ///
    /// Always returns a report; worker failures are in its outcomes, never
    /// raised to the caller.
    pub async fn run(
        &self,
        agency_id: i32,
        ids: impl IntoIterator<Item = String>,
        sink: Arc<RecordByteWriter>,
        params: DumpParams,
    ) -> DumpReport {
        let batches = partition(ids.into_iter().collect(), self.workers);
        info!(
            "Dumping agency {agency_id}: {} sub-batches, {:?} output, {:?} mode",
            batches.len(),
            params.output_format,
            params.mode
        );

        let connections = Arc::new(Semaphore::new(self.workers.min(self.connection_limit)));
        let mut tasks = FuturesUnordered::new();
        for (index, ids) in batches.into_iter().enumerate() {
            let worker = DumpWorker {
                index,
                service: self.service.clone(),
                agency_id,
                ids,
                params,
                sink: Arc::clone(&sink),
                connections: Arc::clone(&connections),
            };
            let handle = tokio::spawn(worker.run());
            tasks.push(async move { (index, handle.await) });
        }

        let mut outcomes = Vec::new();
        while let Some((index, joined)) = tasks.next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(join_error) => {
                    error!("Dump worker {index} did not complete: {join_error}");
                    self.service
                        .stats()
                        .increment_error(ErrorKind::DumpWorkerFailure);
                    outcomes.push(WorkerOutcome {
                        worker: index,
                        written: 0,
                        skipped: 0,
                        error: Some(DumpError::Panicked(index)),
                    });
                }
            }
        }
        outcomes.sort_by_key(|o| o.worker);

        if let Err(e) = sink.flush().await {
            error!("Failed to flush dump sink: {e}");
        }

        let report = DumpReport { outcomes };
        info!(
            "Dump of agency {agency_id} done: {} written, {} skipped, {} failed workers",
            report.written(),
            report.skipped(),
            report.failed_workers().count()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_contiguous_sorted_chunks() {
        let batches = partition(ids(&["C", "A", "B"]), 2);
        assert_eq!(batches, vec![ids(&["A", "B"]), ids(&["C"])]);
    }

    #[test]
    fn test_partition_more_workers_than_ids() {
        let batches = partition(ids(&["x", "y"]), 8);
        assert_eq!(batches, vec![ids(&["x"]), ids(&["y"])]);
    }

    #[test]
    fn test_connection_limit_never_zero() {
        let config = Config {
            dump_workers: 4,
            max_db_connections: 2,
            ..Default::default()
        };
        let service = RecordService::new(
            Arc::new(NoStore),
            Arc::new(crate::marc::JsonRecordCodec),
            crate::merger::MergerPools::new(1, 1),
        );
        let pipeline = DumpPipeline::from_config(service.clone(), &config);
        assert_eq!((pipeline.workers, pipeline.connection_limit), (4, 2));
        let pipeline = DumpPipeline::new(service, 0).with_connection_limit(0);
        assert_eq!((pipeline.workers, pipeline.connection_limit), (1, 1));
    }

    struct NoStore;

    #[async_trait::async_trait]
    impl crate::storage::RawRecordStore for NoStore {
        async fn begin(
            &self,
        ) -> Result<Box<dyn crate::storage::RecordDao>, crate::error_handling::StoreError> {
            Err(crate::error_handling::StoreError::Backend("no store".to_string()))
        }
    }

    #[test]
    fn test_partition_empty_and_duplicates() {
        assert!(partition(Vec::new(), 4).is_empty());
        let batches = partition(ids(&["a", "a", "b"]), 1);
        assert_eq!(batches, vec![ids(&["a", "b"])]);
    }
}
