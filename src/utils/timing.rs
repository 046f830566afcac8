//! Timing metrics for service operations.
//!
//! Every public service operation runs under a `Stopwatch`. Dropping the
//! stopwatch logs the elapsed time at debug level and adds it to the shared
//! `TimingStats`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Count and summed time (microseconds) for one operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationTiming {
    pub count: u64,
    pub total_micros: u64,
}

impl OperationTiming {
    pub fn average_micros(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.total_micros / self.count
        }
    }
}

/// Aggregated timings keyed by operation name.
#[derive(Debug, Default)]
pub struct TimingStats {
    operations: Mutex<BTreeMap<&'static str, OperationTiming>>,
}

impl TimingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, operation: &'static str, elapsed: Duration) {
        let mut operations = match self.operations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let entry = operations.entry(operation).or_default();
        entry.count += 1;
        entry.total_micros += duration_to_micros(elapsed);
    }

    pub fn get(&self, operation: &str) -> OperationTiming {
        let operations = match self.operations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        operations.get(operation).copied().unwrap_or_default()
    }

    /// Logs one line per operation with call count and average time.
    pub fn log_summary(&self) {
        let operations = match self.operations.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if operations.is_empty() {
            log::info!("No timing data collected");
            return;
        }
        log::info!("=== Operation Timing Summary ===");
        for (operation, timing) in operations.iter() {
            log::info!(
                "  {:32} {:>8} calls {:>10} μs avg",
                operation,
                timing.count,
                timing.average_micros()
            );
        }
    }
}

/// Times one operation from creation until drop.
pub struct Stopwatch {
    operation: &'static str,
    started: Instant,
    stats: Option<Arc<TimingStats>>,
}

impl Stopwatch {
    pub fn start(operation: &'static str) -> Self {
        Stopwatch {
            operation,
            started: Instant::now(),
            stats: None,
        }
    }

    /// A stopwatch that also records into `stats` when dropped.
    pub fn recording(operation: &'static str, stats: &Arc<TimingStats>) -> Self {
        Stopwatch {
            operation,
            started: Instant::now(),
            stats: Some(Arc::clone(stats)),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Stopwatch {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        log::debug!("{} took {} μs", self.operation, duration_to_micros(elapsed));
        if let Some(stats) = &self.stats {
            stats.record(self.operation, elapsed);
        }
    }
}

pub fn duration_to_micros(duration: Duration) -> u64 {
    duration.as_micros() as u64
}
