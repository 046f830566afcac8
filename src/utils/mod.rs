//! Utility helpers.
//!
//! This module provides:
//! - Operation timing (`Stopwatch`, `TimingStats`)

mod timing;

pub use timing::{duration_to_micros, OperationTiming, Stopwatch, TimingStats};
