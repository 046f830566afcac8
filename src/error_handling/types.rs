//! Error type definitions.
//!
//! `ServiceError` is the taxonomy callers see. Everything below it
//! (`StoreError`, `CodecError`, `PoolError`) is folded into
//! `ServiceError::InternalServer` at the service boundary.

use std::fmt;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

use crate::merger::MergerFlavor;
use crate::models::RecordId;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// The configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The reference store could not be opened.
    #[error("Database initialization error: {0}")]
    DatabaseError(#[from] StoreError),
}

/// Errors raised by a record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// Stored content for a record could not be decoded or re-encoded.
    #[error("Content of record {id} is unreadable: {source}")]
    Content {
        id: RecordId,
        #[source]
        source: CodecError,
    },

    /// Any other backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Errors raised while decoding or encoding record content.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Malformed record content: {0}")]
    Decode(String),

    #[error("Record could not be encoded: {0}")]
    Encode(String),
}

/// Errors raised by the merger pools.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool has been shut down; no further checkouts are possible.
    #[error("Merger pool ({0}) is closed")]
    Closed(MergerFlavor),
}

/// Failures grouped under `ServiceError::InternalServer`.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error("{0}")]
    Storage(#[from] StoreError),

    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("{0}")]
    Pool(#[from] PoolError),
}

/// Why a record was reported as not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// No slot exists (deleted records were acceptable).
    Missing,
    /// No live slot exists; the slot may be absent or deleted.
    MissingOrDeleted,
    /// The slot exists but resolution produced no content.
    EmptyContent,
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotFoundReason::Missing => "was not found",
            NotFoundReason::MissingOrDeleted => "was not found or is deleted",
            NotFoundReason::EmptyContent => "resolved to empty content",
        })
    }
}

/// Errors returned by the record service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No eligible content for the identity under the requested deletion policy.
    #[error("Record '{id}' {reason}")]
    NotFound { id: RecordId, reason: NotFoundReason },

    /// A collection member's content type cannot be merged as MARC exchange.
    #[error("Cannot make marcx:collection from mimetype: {mime_type} (record '{id}')")]
    MergeConflict { id: RecordId, mime_type: String },

    /// Storage, codec, or pool failure.
    #[error("Internal server error: {0}")]
    InternalServer(#[from] InternalError),
}

impl ServiceError {
    pub fn not_found(id: &RecordId, reason: NotFoundReason) -> Self {
        ServiceError::NotFound {
            id: id.clone(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound { .. } => ErrorKind::NotFound,
            ServiceError::MergeConflict { .. } => ErrorKind::MergeConflict,
            ServiceError::InternalServer(_) => ErrorKind::InternalServer,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::InternalServer(InternalError::Storage(e))
    }
}

impl From<CodecError> for ServiceError {
    fn from(e: CodecError) -> Self {
        ServiceError::InternalServer(InternalError::Codec(e))
    }
}

impl From<PoolError> for ServiceError {
    fn from(e: PoolError) -> Self {
        ServiceError::InternalServer(InternalError::Pool(e))
    }
}

/// Errors that end one dump worker's sub-batch.
#[derive(Error, Debug)]
pub enum DumpError {
    #[error("Failed to resolve record {id}: {source}")]
    Resolve {
        id: RecordId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to decode record {id}: {source}")]
    Decode {
        id: RecordId,
        #[source]
        source: CodecError,
    },

    #[error("Failed to write to dump sink: {0}")]
    Write(#[from] std::io::Error),

    #[error("Dump worker could not start: {0}")]
    Setup(String),

    #[error("Dump worker {0} panicked")]
    Panicked(usize),
}

/// Outcome categories counted by `ServiceStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    NotFound,
    MergeConflict,
    InternalServer,
    DumpWorkerFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Record not found",
            ErrorKind::MergeConflict => "Merge conflict",
            ErrorKind::InternalServer => "Internal server error",
            ErrorKind::DumpWorkerFailure => "Dump worker failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
