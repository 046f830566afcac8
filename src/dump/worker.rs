//! One dump worker: a sub-batch in its own unit of work.

use std::sync::Arc;

use log::{debug, error, warn};
use tokio::sync::Semaphore;

use crate::error_handling::{DumpError, ErrorKind};
use crate::models::RecordId;
use crate::service::RecordService;

use super::sink::RecordByteWriter;
use super::source::decoded_content;
use super::types::{DumpMode, DumpParams, WorkerOutcome};

pub(crate) struct DumpWorker {
    pub index: usize,
    pub service: RecordService,
    pub agency_id: i32,
    pub ids: Vec<String>,
    pub params: DumpParams,
    pub sink: Arc<RecordByteWriter>,
    /// Shared with the other workers; one permit per database connection.
    pub connections: Arc<Semaphore>,
}

impl DumpWorker {
    /// Writes every resolvable record of the sub-batch, in order, stopping at
    /// the first failure. Never returns an error: failures end up in the outcome.
    pub async fn run(self) -> WorkerOutcome {
        let mut outcome = WorkerOutcome {
            worker: self.index,
            written: 0,
            skipped: 0,
            error: None,
        };

        if let Err(e) = self.process(&mut outcome).await {
            error!(
                "Dump worker {} stopped after {} records: {e}",
                self.index, outcome.written
            );
            self.service.stats().increment_error(ErrorKind::DumpWorkerFailure);
            outcome.error = Some(e);
        } else {
            debug!(
                "Dump worker {} finished: {} written, {} skipped",
                self.index, outcome.written, outcome.skipped
            );
        }
        outcome
    }

    async fn process(&self, outcome: &mut WorkerOutcome) -> Result<(), DumpError> {
        let _connection = self
            .connections
            .acquire()
            .await
            .map_err(|e| DumpError::Setup(e.to_string()))?;
        let mut dao = self
            .service
            .store()
            .begin()
            .await
            .map_err(|e| DumpError::Setup(e.to_string()))?;
        let mut merger = match self.params.mode {
            DumpMode::Merged => Some(
                self.service
                    .mergers()
                    .checkout(false)
                    .await
                    .map_err(|e| DumpError::Setup(e.to_string()))?,
            ),
            DumpMode::Raw => None,
        };

        let codec = Arc::clone(self.service.codec());
        let mut result = Ok(());
        for bibliographic_record_id in &self.ids {
            let id = RecordId::new(bibliographic_record_id.clone(), self.agency_id);
            let item = match decoded_content(
                dao.as_mut(),
                codec.as_ref(),
                &id,
                self.params,
                merger.as_deref_mut(),
            )
            .await
            {
                Ok(item) => item,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            };
            match item {
                Some(item) => {
                    if let Err(e) = self.sink.write(&item.local).await {
                        result = Err(DumpError::from(e));
                        break;
                    }
                    outcome.written += 1;
                }
                None => {
                    debug!("Dump worker {}: skipping {id}", self.index);
                    outcome.skipped += 1;
                }
            }
        }
        drop(merger);

        let closed = if result.is_ok() {
            dao.commit().await
        } else {
            dao.rollback().await
        };
        if let Err(e) = closed {
            warn!("Dump worker {}: closing unit of work failed: {e}", self.index);
        }
        result
    }
}
