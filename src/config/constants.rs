//! Configuration constants.
//!
//! This module defines the defaults and fixed identifiers used throughout the
//! service: pool capacities, worker counts, well-known agencies and the
//! MARC exchange mime types.

/// Default SQLite database path for the reference record store
pub const DB_PATH: &str = "./rawrepo.db";

/// Default maximum number of pooled database connections
pub const DB_MAX_CONNECTIONS: u32 = 8;

/// Default time a unit of work waits for a pooled database connection
pub const DB_ACQUIRE_TIMEOUT_SECS: u64 = 30;

// Merger pools
/// Default number of merge engines in the default-overlay pool
pub const DEFAULT_MERGER_POOL_SIZE: usize = 8;
/// Default number of merge engines in the parent-agency-overlay pool
pub const DEFAULT_PARENT_MERGER_POOL_SIZE: usize = 4;
/// Upper bound for either merger pool; each engine holds its own scratch state
pub const MAX_MERGER_POOL_SIZE: usize = 256;

// Bulk dump
/// Default number of concurrent dump workers
pub const DEFAULT_DUMP_WORKERS: usize = 4;
/// Upper bound on dump workers
pub const MAX_DUMP_WORKERS: usize = 64;

// Well-known agencies
/// The shared common-base agency (national bibliography)
pub const COMMON_AGENCY: i32 = 870970;
/// Agency holding article records
pub const ARTICLE_AGENCY: i32 = 870971;
/// Agency holding authority records
pub const AUTHORITY_AGENCY: i32 = 870979;

// MARC exchange mime types
pub const MIMETYPE_MARCXCHANGE: &str = "text/marcxchange";
pub const MIMETYPE_ARTICLE: &str = "text/article+marcxchange";
pub const MIMETYPE_AUTHORITY: &str = "text/authority+marcxchange";
pub const MIMETYPE_ENRICHMENT: &str = "text/enrichment+marcxchange";

// Authority link subfields
/// Subfield code naming the agency of a linked authority record
pub const AUTHORITY_AGENCY_SUBFIELD: char = '5';
/// Subfield code naming the bibliographic id of a linked authority record
pub const AUTHORITY_ID_SUBFIELD: char = '6';
