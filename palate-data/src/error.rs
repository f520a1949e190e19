//! Errors raised by the SQLite stores.

use camino::Utf8PathBuf;
use palate_core::StoreError;
use rusqlite::Error as SqliteError;
use thiserror::Error;

/// Errors raised when opening, reading or writing the SQLite stores.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating tables or indexes failed.
    #[error("failed to initialise the database schema")]
    Schema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A statement failed.
    #[error("failed to {operation}")]
    Query {
        /// Description of the failed operation.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A stored row could not be decoded.
    #[error("invalid stored record {record}: {reason}")]
    Decode {
        /// Identifier of the row.
        record: String,
        /// Why the row was rejected.
        reason: String,
    },
    /// Encoding a value for storage failed.
    #[error("failed to encode {record} for storage")]
    Encode {
        /// Identifier of the record.
        record: String,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// Reading an import file failed.
    #[error("failed to read import file {path:?}")]
    ReadImport {
        /// Import file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// An import file did not contain a JSON array of notes.
    #[error("failed to parse notes from {path:?}")]
    ParseImport {
        /// Import file path.
        path: Utf8PathBuf,
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The blocking worker running a database task failed.
    #[error("database task for {operation} did not complete")]
    Task {
        /// Description of the interrupted operation.
        operation: &'static str,
        /// Source error from the Tokio runtime.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl SqliteStoreError {
    /// Short label describing which step failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::CreateDirectory { .. } => "create database directory",
            Self::Open { .. } => "open database",
            Self::Schema { .. } => "initialise schema",
            Self::Query { operation, .. } | Self::Task { operation, .. } => *operation,
            Self::Decode { .. } => "decode record",
            Self::Encode { .. } => "encode record",
            Self::ReadImport { .. } => "read import file",
            Self::ParseImport { .. } => "parse import file",
        }
    }

    pub(crate) fn query(operation: &'static str) -> impl FnOnce(SqliteError) -> Self {
        move |source| Self::Query { operation, source }
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Decode { record, reason } => Self::InvalidRecord { record, reason },
            other => Self::Backend {
                operation: other.operation(),
                message: error_chain(&other),
            },
        }
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
