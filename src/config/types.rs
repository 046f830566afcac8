//! Configuration types.
//!
//! This module defines the service configuration struct and the enums used
//! to configure logging.

use std::path::PathBuf;

use crate::config::constants::{
    ARTICLE_AGENCY, AUTHORITY_AGENCY, COMMON_AGENCY, DB_ACQUIRE_TIMEOUT_SECS, DB_MAX_CONNECTIONS,
    DB_PATH,
    DEFAULT_DUMP_WORKERS, DEFAULT_MERGER_POOL_SIZE, DEFAULT_PARENT_MERGER_POOL_SIZE,
    MAX_DUMP_WORKERS, MAX_MERGER_POOL_SIZE,
};
use crate::error_handling::InitializationError;

/// Logging level for the service.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Service configuration.
///
/// Everything here is read once at process start: the merger pool capacities
/// and the relation hints live for the whole process.
///
/// # Examples
///
/// ```no_run
/// use rawrepo_record_service::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     db_path: PathBuf::from("/var/lib/rawrepo/rawrepo.db"),
///     dump_workers: 8,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path (SQLite file) for the reference record store
    pub db_path: PathBuf,

    /// Maximum pooled database connections
    pub max_db_connections: u32,

    /// Seconds a unit of work waits for a pooled connection before failing
    pub db_acquire_timeout_secs: u64,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Capacity of the default-overlay merger pool
    pub default_merger_pool_size: usize,

    /// Capacity of the parent-agency-overlay merger pool
    pub parent_merger_pool_size: usize,

    /// Number of concurrent bulk dump workers
    pub dump_workers: usize,

    /// Common agencies in overlay priority order
    pub common_agencies: Vec<i32>,

    /// Agency that owns authority records
    pub authority_agency: i32,

    /// Agencies whose records never overlay common content
    pub stand_alone_agencies: Vec<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            max_db_connections: DB_MAX_CONNECTIONS,
            db_acquire_timeout_secs: DB_ACQUIRE_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            default_merger_pool_size: DEFAULT_MERGER_POOL_SIZE,
            parent_merger_pool_size: DEFAULT_PARENT_MERGER_POOL_SIZE,
            dump_workers: DEFAULT_DUMP_WORKERS,
            common_agencies: vec![COMMON_AGENCY, ARTICLE_AGENCY, AUTHORITY_AGENCY],
            authority_agency: AUTHORITY_AGENCY,
            stand_alone_agencies: Vec::new(),
        }
    }
}

impl Config {
    /// Checks that the configuration can be used to build the service.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::InvalidConfig` naming the first offending setting.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.max_db_connections == 0 {
            return Err(InitializationError::InvalidConfig(
                "max_db_connections must be at least 1".to_string(),
            ));
        }
        for (name, size) in [
            ("default_merger_pool_size", self.default_merger_pool_size),
            ("parent_merger_pool_size", self.parent_merger_pool_size),
        ] {
            if size == 0 || size > MAX_MERGER_POOL_SIZE {
                return Err(InitializationError::InvalidConfig(format!(
                    "{name} must be between 1 and {MAX_MERGER_POOL_SIZE}, got {size}"
                )));
            }
        }
        if self.dump_workers == 0 || self.dump_workers > MAX_DUMP_WORKERS {
            return Err(InitializationError::InvalidConfig(format!(
                "dump_workers must be between 1 and {MAX_DUMP_WORKERS}, got {}",
                self.dump_workers
            )));
        }
        // every dump worker holds one connection for its whole sub-batch
        if self.dump_workers > self.max_db_connections as usize {
            return Err(InitializationError::InvalidConfig(format!(
                "dump_workers ({}) must not exceed max_db_connections ({})",
                self.dump_workers, self.max_db_connections
            )));
        }
        if self.db_acquire_timeout_secs == 0 {
            return Err(InitializationError::InvalidConfig(
                "db_acquire_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.common_agencies.is_empty() {
            return Err(InitializationError::InvalidConfig(
                "common_agencies must name at least one agency".to_string(),
            ));
        }
        Ok(())
    }
}
