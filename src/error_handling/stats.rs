//! Service statistics tracking.
//!
//! Thread-safe counters for failures and completed operations, shared by the
//! record service and the dump pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::ErrorKind;

/// Thread-safe service statistics tracker.
///
/// All error kinds are initialized to zero on creation, so counters can be
/// bumped concurrently from any task without locking. Share it with `Arc`.
pub struct ServiceStats {
    errors: HashMap<ErrorKind, AtomicUsize>,
    completed: AtomicUsize,
}

impl ServiceStats {
    pub fn new() -> Self {
        let mut errors = HashMap::new();
        for kind in ErrorKind::iter() {
            errors.insert(kind, AtomicUsize::new(0));
        }

        ServiceStats {
            errors,
            completed: AtomicUsize::new(0),
        }
    }

    /// Increment an error counter.
    pub fn increment_error(&self, kind: ErrorKind) {
        if let Some(counter) = self.errors.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment error counter for {:?} which is not in the map. \
                 This indicates a bug in ServiceStats initialization.",
                kind
            );
        }
    }

    /// Count one operation that finished without error.
    pub fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the count for an error kind.
    pub fn get_error_count(&self, kind: ErrorKind) -> usize {
        self.errors
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Get total error count across all error kinds.
    pub fn total_errors(&self) -> usize {
        ErrorKind::iter().map(|k| self.get_error_count(k)).sum()
    }
}

impl Default for ServiceStats {
    fn default() -> Self {
        Self::new()
    }
}
