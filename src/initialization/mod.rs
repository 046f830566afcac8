//! Process-level initialization.
//!
//! This module provides:
//! - Logger setup (`init_logger_with`)
//!
//! Shared resources (database pool, merger pools) are built by
//! `RecordService::from_config`.

mod logger;

pub use logger::init_logger_with;
