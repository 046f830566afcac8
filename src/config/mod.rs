//! Service configuration and constants.
//!
//! This module provides:
//! - Configuration constants (pool capacities, agencies, mime types)
//! - The `Config` struct and its validation

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel};
