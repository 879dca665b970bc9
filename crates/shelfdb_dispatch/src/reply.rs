//! Replies and tagged failures returned across the dispatch boundary.

use serde::{Deserialize, Serialize};
use shelfdb_core::{CoreError, ExecOutcome, ResultSet, SchemaObject};
use shelfdb_store::StoreError;
use thiserror::Error;

/// What a successful request returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum Reply {
    /// The operation completed with nothing to return.
    Done,
    /// Open collection names.
    Collections {
        /// The names, sorted.
        names: Vec<String>,
    },
    /// An exported binary image.
    Blob {
        /// The image bytes.
        data: Vec<u8>,
    },
    /// Schema objects of a collection.
    Schema {
        /// The objects, sorted by name.
        objects: Vec<SchemaObject>,
    },
    /// Rows of one table.
    Entries {
        /// The result set.
        entries: ResultSet,
    },
    /// Outcome of a raw statement.
    Execution {
        /// Rows or rows-changed.
        outcome: ExecOutcome,
    },
    /// Saved packets.
    Packets {
        /// The packets, newest first.
        packets: Vec<Packet>,
    },
    /// Saved schemas.
    Schemas {
        /// The schemas, newest first.
        schemas: Vec<SavedSchema>,
    },
}

/// A saved packet: a named group of URLs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    /// Rowid in the reserved collection.
    pub id: i64,
    /// Packet name.
    pub name: String,
    /// The grouped URLs.
    pub urls: Vec<String>,
}

/// A saved schema from the reserved schema library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSchema {
    /// Rowid in the reserved collection.
    pub id: i64,
    /// Schema name.
    pub name: String,
    /// The schema's SQL text.
    pub sql: String,
}

/// Machine-readable failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    /// Collection, checkpoint, table, or row absent.
    NotFound,
    /// Duplicate create.
    AlreadyExists,
    /// Checkpoint bytes do not deserialize.
    CorruptImage,
    /// Checkpoint exceeds the store's per-record ceiling.
    TooLarge,
    /// Malformed or failing SQL.
    Query,
    /// Startup restoration has not completed.
    NotReady,
    /// Collection name not usable.
    InvalidName,
    /// The durable store failed.
    Store,
}

/// A failure crossing the dispatch boundary.
///
/// Nothing is thrown across the boundary: every error becomes a tagged
/// failure with a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind:?}: {message}")]
pub struct Failure {
    /// The failure category.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

impl From<CoreError> for Failure {
    fn from(error: CoreError) -> Self {
        let kind = match &error {
            CoreError::CollectionNotFound { .. }
            | CoreError::CheckpointNotFound { .. }
            | CoreError::TableNotFound { .. }
            | CoreError::RowNotFound { .. } => FailureKind::NotFound,
            CoreError::CollectionExists { .. } => FailureKind::AlreadyExists,
            CoreError::CorruptImage { .. } => FailureKind::CorruptImage,
            CoreError::Store(StoreError::ValueTooLarge { .. }) => FailureKind::TooLarge,
            CoreError::Engine(_) => FailureKind::Query,
            CoreError::NotReady => FailureKind::NotReady,
            CoreError::InvalidName { .. } => FailureKind::InvalidName,
            CoreError::Store(_) | CoreError::Io(_) => FailureKind::Store,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

/// Result type crossing the dispatch boundary.
pub type DispatchResult = Result<Reply, Failure>;
