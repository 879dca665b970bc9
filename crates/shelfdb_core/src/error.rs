//! Error types for ShelfDB core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ShelfDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Durable store error.
    #[error("store error: {0}")]
    Store(#[from] shelfdb_store::StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The relational engine rejected or failed a statement.
    #[error("query error: {0}")]
    Engine(#[from] rusqlite::Error),

    /// No live handle exists for the named collection.
    #[error("collection not found: {name}")]
    CollectionNotFound {
        /// Name of the collection.
        name: String,
    },

    /// No durable checkpoint exists for the named collection.
    #[error("no checkpoint for collection: {name}")]
    CheckpointNotFound {
        /// Name of the collection.
        name: String,
    },

    /// The named table does not exist in the collection.
    #[error("table not found: {table} in collection {collection}")]
    TableNotFound {
        /// The collection that was searched.
        collection: String,
        /// The table that was not found.
        table: String,
    },

    /// The referenced row does not exist in the collection.
    #[error("row not found: rowid {id} in collection {collection}")]
    RowNotFound {
        /// The collection that was searched.
        collection: String,
        /// The rowid that was not found.
        id: i64,
    },

    /// A collection with this name already exists, live or checkpointed.
    #[error("collection already exists: {name}")]
    CollectionExists {
        /// Name of the collection.
        name: String,
    },

    /// Bytes are not a well-formed engine image.
    #[error("corrupt image: {message}")]
    CorruptImage {
        /// Description of the corruption.
        message: String,
    },

    /// A collection name is not usable.
    #[error("invalid collection name: {name:?} (expected 1-64 chars of [A-Za-z0-9_-])")]
    InvalidName {
        /// The offending name.
        name: String,
    },

    /// The manager has not finished startup restoration.
    #[error("manager not ready: startup restoration has not completed")]
    NotReady,
}

impl CoreError {
    /// Creates a collection-not-found error.
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates a checkpoint-not-found error.
    pub fn checkpoint_not_found(name: impl Into<String>) -> Self {
        Self::CheckpointNotFound { name: name.into() }
    }

    /// Creates a table-not-found error.
    pub fn table_not_found(collection: impl Into<String>, table: impl Into<String>) -> Self {
        Self::TableNotFound {
            collection: collection.into(),
            table: table.into(),
        }
    }

    /// Creates a row-not-found error.
    pub fn row_not_found(collection: impl Into<String>, id: i64) -> Self {
        Self::RowNotFound {
            collection: collection.into(),
            id,
        }
    }

    /// Creates a collection-exists error.
    pub fn collection_exists(name: impl Into<String>) -> Self {
        Self::CollectionExists { name: name.into() }
    }

    /// Creates a corrupt-image error.
    pub fn corrupt_image(message: impl Into<String>) -> Self {
        Self::CorruptImage {
            message: message.into(),
        }
    }

    /// Creates an invalid-name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }
}
