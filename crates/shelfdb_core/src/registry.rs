//! In-memory registry of live collection handles.

use crate::error::{CoreError, CoreResult};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::collections::BTreeMap;

/// The in-memory mapping from collection name to live engine handle.
///
/// The registry is the single source of truth for "is this collection
/// open": no two calls ever observe two distinct live handles for the same
/// name. It never talks to the durable store - restoration and
/// checkpointing are the manager's job.
///
/// Live handles are `Send` but not `Sync`, so the map sits behind a mutex
/// and handle access happens through [`CollectionRegistry::with_handle`].
#[derive(Default)]
pub struct CollectionRegistry {
    handles: Mutex<BTreeMap<String, Connection>>,
}

impl CollectionRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a live handle exists for `name`.
    #[must_use]
    pub fn is_open(&self, name: &str) -> bool {
        self.handles.lock().contains_key(name)
    }

    /// Registers a live handle for `name`, returning the replaced handle
    /// if one was already open.
    pub fn register(&self, name: &str, conn: Connection) -> Option<Connection> {
        self.handles.lock().insert(name.to_string(), conn)
    }

    /// Releases the live handle for `name`, if any.
    ///
    /// The durable checkpoint, if one exists, is untouched. The returned
    /// handle is dropped by the caller, releasing engine resources.
    pub fn close(&self, name: &str) -> Option<Connection> {
        self.handles.lock().remove(name)
    }

    /// Returns the names of all open collections, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.handles.lock().keys().cloned().collect()
    }

    /// Returns the number of open collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.lock().len()
    }

    /// Returns true if no collection is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.lock().is_empty()
    }

    /// Runs `f` against the live handle for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CollectionNotFound`] if no live handle exists,
    /// or whatever `f` returns.
    pub fn with_handle<R>(
        &self,
        name: &str,
        f: impl FnOnce(&Connection) -> CoreResult<R>,
    ) -> CoreResult<R> {
        let handles = self.handles.lock();
        let conn = handles
            .get(name)
            .ok_or_else(|| CoreError::collection_not_found(name))?;
        f(conn)
    }
}

impl std::fmt::Debug for CollectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRegistry")
            .field("open", &self.names())
            .finish()
    }
}
