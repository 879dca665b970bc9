//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value exceeded the store's per-entry size ceiling.
    #[error("value for key {key:?} is too large: {size} bytes exceeds limit of {limit}")]
    ValueTooLarge {
        /// The key the value was destined for.
        key: String,
        /// The size of the rejected value.
        size: usize,
        /// The store's per-value limit.
        limit: usize,
    },

    /// A key is not usable by this store.
    #[error("invalid key: {key:?}: {message}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why the key was rejected.
        message: String,
    },

    /// The backing storage is unavailable or failing.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Creates a value-too-large error.
    pub fn value_too_large(key: impl Into<String>, size: usize, limit: usize) -> Self {
        Self::ValueTooLarge {
            key: key.into(),
            size,
            limit,
        }
    }

    /// Creates an invalid-key error.
    pub fn invalid_key(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            message: message.into(),
        }
    }
}
