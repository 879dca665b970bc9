//! In-memory store for testing.

use crate::error::{StoreError, StoreResult};
use crate::store::{DurableStore, DEFAULT_MAX_VALUE_SIZE};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory key-value store.
///
/// This store keeps all records in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral managers that don't need persistence
///
/// # Thread Safety
///
/// This store is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use shelfdb_store::{DurableStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.put("checkpoint_a", b"one").unwrap();
/// store.put("checkpoint_b", b"two").unwrap();
/// assert_eq!(store.keys("checkpoint_").unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct MemoryStore {
    records: RwLock<BTreeMap<String, Vec<u8>>>,
    max_value_size: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates a new empty in-memory store with the default size ceiling.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_value_size(DEFAULT_MAX_VALUE_SIZE)
    }

    /// Creates a new empty in-memory store with a custom size ceiling.
    ///
    /// Useful for testing the too-large failure path without allocating
    /// multi-megabyte values.
    #[must_use]
    pub fn with_max_value_size(max_value_size: usize) -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            max_value_size,
        }
    }

    /// Writes a record directly, bypassing the size ceiling.
    ///
    /// Useful for seeding tests with records a well-behaved writer would
    /// not produce (e.g. corrupt checkpoint images).
    pub fn put_unchecked(&self, key: &str, value: &[u8]) {
        self.records.write().insert(key.to_string(), value.to_vec());
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Clears all records from the store.
    pub fn clear(&self) {
        self.records.write().clear();
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.records.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        if value.len() > self.max_value_size {
            return Err(StoreError::value_too_large(
                key,
                value.len(),
                self.max_value_size,
            ));
        }
        self.records.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.records.write().remove(key);
        Ok(())
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .records
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn max_value_size(&self) -> usize {
        self.max_value_size
    }
}
