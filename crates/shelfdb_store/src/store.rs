//! Durable store trait definition.

use crate::error::StoreResult;

/// Default per-value size ceiling: 5 MiB.
///
/// This mirrors the practical per-entry bound of browser-style extension
/// storage, where a single record beyond a few megabytes is rejected.
pub const DEFAULT_MAX_VALUE_SIZE: usize = 5 * 1024 * 1024;

/// A durable key-value store for ShelfDB checkpoints.
///
/// Stores are **opaque byte stores**. They provide simple keyed operations
/// for reading, writing, and enumerating records. ShelfDB owns all value
/// interpretation - stores do not understand checkpoint images or key
/// derivation.
///
/// # Invariants
///
/// - `get` after a successful `put` returns exactly the bytes written
/// - `put` replaces any existing value whole; a failed `put` leaves the
///   previous value readable
/// - `put` of a value larger than [`Self::max_value_size`] fails with
///   `ValueTooLarge` and never truncates
/// - `remove` of an absent key is a no-op
/// - `keys` returns every stored key with the given prefix, sorted
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::DirStore`] - For persistent storage
pub trait DurableStore: Send + Sync {
    /// Reads the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage fails.
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Writes `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `value` exceeds the per-value size ceiling (`ValueTooLarge`)
    /// - `key` is not usable by this store (`InvalidKey`)
    /// - the backing storage fails
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage fails.
    fn remove(&self, key: &str) -> StoreResult<()>;

    /// Returns all stored keys starting with `prefix`, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage fails.
    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Returns the per-value size ceiling enforced by `put`.
    fn max_value_size(&self) -> usize {
        DEFAULT_MAX_VALUE_SIZE
    }
}
