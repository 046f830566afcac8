//! rawrepo_record_service library: effective bibliographic record resolution
//!
//! This library resolves the content of a bibliographic record as one agency
//! sees it: the agency's own content overlaid onto shared common content,
//! optionally with authority links expanded and private fields removed. It
//! also assembles a record together with its parent records, answers
//! relation queries and dumps many records in parallel.
//!
//! # Example
//!
//! ```no_run
//! use rawrepo_record_service::{Config, RecordId, RecordService, ResolveOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     db_path: std::path::PathBuf::from("./rawrepo.db"),
//!     ..Default::default()
//! };
//! let service = RecordService::from_config(&config).await?;
//!
//! let id = RecordId::new("12345678", 710100);
//! let record = service
//!     .fetch_resolved(&id, ResolveOptions { strip_private: true, ..Default::default() })
//!     .await?;
//! println!("{} via {}", record.id, record.enrichment_trail);
//!
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Every service operation is an
//! `async fn` that runs on the caller's task.

pub mod config;
pub mod dto;
pub mod dump;
pub mod error_handling;
pub mod initialization;
pub mod marc;
pub mod merger;
pub mod models;
pub mod service;
pub mod storage;
pub mod utils;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use dump::{DumpMode, DumpParams, DumpPipeline, DumpReport, OutputFormat, RecordByteWriter};
pub use error_handling::{NotFoundReason, ServiceError, ServiceStats};
pub use marc::{JsonRecordCodec, MarcRecord, RecordCodec};
pub use merger::{MergerFlavor, MergerPools, RelationHints, StaticRelationHints};
pub use models::{Record, RecordId};
pub use service::{RecordService, ResolveOptions};
pub use storage::{RawRecordStore, RecordCollection, RecordDao, SqliteRecordStore};
