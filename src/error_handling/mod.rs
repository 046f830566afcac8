//! Error handling and service statistics.
//!
//! This module provides:
//! - The service error taxonomy (`ServiceError`) and the lower-level errors
//!   it absorbs (storage, codec, pool)
//! - Dump worker errors
//! - Thread-safe counters of failures per kind
//!
//! Callers only ever see three outcomes: **NotFound**, **MergeConflict** and
//! **InternalServer**. Storage and codec failures never leak out under their own name.

mod stats;
mod types;

// Re-export public API
pub use stats::ServiceStats;
pub use types::{
    CodecError, DumpError, ErrorKind, InitializationError, InternalError, NotFoundReason,
    PoolError, ServiceError, StoreError,
};
