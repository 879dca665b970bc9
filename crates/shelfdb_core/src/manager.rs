//! Checkpoint manager: collection lifecycle orchestration.

use crate::codec;
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::registry::CollectionRegistry;
use parking_lot::Mutex;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use shelfdb_store::DurableStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the reserved packet-URL-group collection.
pub const PACKETS_COLLECTION: &str = "packets";

/// Name of the reserved saved-query-schema collection.
pub const SCHEMAS_COLLECTION: &str = "schemas";

/// Baseline schema applied when the `packets` collection is first created.
pub const PACKETS_BASELINE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS packets (
    name TEXT NOT NULL,
    urls TEXT NOT NULL,
    created INTEGER NOT NULL DEFAULT (strftime('%s','now'))
)";

/// Baseline schema applied when the `schemas` collection is first created.
pub const SCHEMAS_BASELINE_SQL: &str = "\
CREATE TABLE IF NOT EXISTS schemas (
    name TEXT NOT NULL,
    sql TEXT NOT NULL,
    created INTEGER NOT NULL DEFAULT (strftime('%s','now'))
)";

/// Where a collection currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CollectionState {
    /// A live handle is open in the registry.
    Open,
    /// No live handle, but a durable checkpoint exists.
    Unopened,
    /// Neither a live handle nor a checkpoint exists.
    Absent,
}

/// Outcome of a restore-all pass over the checkpoint namespace.
#[derive(Debug, Default)]
pub struct RestoreReport {
    /// Collections restored successfully, in key order.
    pub restored: Vec<String>,
    /// Collections whose checkpoint failed to restore, with the cause.
    /// A failure here never aborts the overall pass.
    pub failed: Vec<(String, CoreError)>,
}

/// Orchestrates collection lifecycle and checkpoint persistence.
///
/// The manager owns the [`CollectionRegistry`] and is the only component
/// that talks to the durable store. It is built once at process start;
/// every caller-facing operation is gated behind [`Self::initialize`],
/// which restores all durable checkpoints and bootstraps the reserved
/// collections before anything else is served. Premature calls fail with
/// [`CoreError::NotReady`].
///
/// # Example
///
/// ```rust
/// use shelfdb_core::{CheckpointManager, Config};
/// use shelfdb_store::MemoryStore;
/// use std::sync::Arc;
///
/// let manager = CheckpointManager::new(Arc::new(MemoryStore::new()), Config::default());
/// let report = manager.initialize().unwrap();
/// assert!(report.failed.is_empty());
/// assert_eq!(manager.list_collections().unwrap(), vec!["packets", "schemas"]);
/// ```
pub struct CheckpointManager {
    store: Arc<dyn DurableStore>,
    registry: CollectionRegistry,
    config: Config,
    ready: AtomicBool,
    // Serializes initialize() so restoration runs exactly once even when
    // the manager is shared across threads.
    init_lock: Mutex<()>,
}

impl CheckpointManager {
    /// Creates a manager over the given store. Call [`Self::initialize`]
    /// before serving operations.
    pub fn new(store: Arc<dyn DurableStore>, config: Config) -> Self {
        Self {
            store,
            registry: CollectionRegistry::new(),
            config,
            ready: AtomicBool::new(false),
            init_lock: Mutex::new(()),
        }
    }

    /// Restores every durable checkpoint and bootstraps the reserved
    /// collections, then opens the gate for caller operations.
    ///
    /// Single-shot: concurrent callers block until the first finishes,
    /// and every later call returns an empty report.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be enumerated or a reserved
    /// collection cannot be bootstrapped. Per-collection restore failures
    /// are reported, not raised.
    pub fn initialize(&self) -> CoreResult<RestoreReport> {
        let _guard = self.init_lock.lock();
        if self.ready.load(Ordering::Acquire) {
            return Ok(RestoreReport::default());
        }

        let report = self.restore_all_inner()?;
        if self.config.bootstrap_reserved {
            self.ensure_inner(PACKETS_COLLECTION, PACKETS_BASELINE_SQL)?;
            self.ensure_inner(SCHEMAS_COLLECTION, SCHEMAS_BASELINE_SQL)?;
        }
        self.ready.store(true, Ordering::Release);

        info!(
            restored = report.restored.len(),
            failed = report.failed.len(),
            "startup restoration complete"
        );
        Ok(report)
    }

    /// Returns the names of all open collections, sorted.
    ///
    /// # Errors
    ///
    /// Fails with `NotReady` before initialization.
    pub fn list_collections(&self) -> CoreResult<Vec<String>> {
        self.ensure_ready()?;
        Ok(self.registry.names())
    }

    /// Reports where a collection currently lives.
    ///
    /// # Errors
    ///
    /// Fails with `NotReady` before initialization, or if the store fails.
    pub fn state(&self, name: &str) -> CoreResult<CollectionState> {
        self.ensure_ready()?;
        if self.registry.is_open(name) {
            return Ok(CollectionState::Open);
        }
        if self.store.get(&self.key_for(name))?.is_some() {
            return Ok(CollectionState::Unopened);
        }
        Ok(CollectionState::Absent)
    }

    /// Creates a new empty collection and checkpoints it immediately.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::CollectionExists`] when a live handle *or*
    /// a checkpoint already exists for `name`; create never overwrites
    /// existing data. The handle is registered only after the checkpoint
    /// write succeeds, so a failed create leaves no trace and the name
    /// stays free for a retry.
    pub fn create_collection(&self, name: &str) -> CoreResult<()> {
        self.ensure_ready()?;
        validate_name(name)?;

        if self.registry.is_open(name) || self.store.get(&self.key_for(name))?.is_some() {
            return Err(CoreError::collection_exists(name));
        }

        let conn = Connection::open_in_memory()?;
        self.checkpoint_and_register(name, conn)
    }

    /// Serializes the open handle for `name` and writes its durable
    /// checkpoint, replacing the previous one.
    ///
    /// Invoked after every mutating operation so data loss is bounded by
    /// the last successful checkpoint. The previous record stays valid
    /// until the new write succeeds.
    ///
    /// # Errors
    ///
    /// Fails with `CollectionNotFound` when no handle is open, or
    /// surfaces the store's `ValueTooLarge` when the image exceeds the
    /// per-record ceiling.
    pub fn save_checkpoint(&self, name: &str) -> CoreResult<()> {
        self.ensure_ready()?;
        self.write_checkpoint(name)
    }

    /// Restores `name` from its durable checkpoint.
    ///
    /// Durable state wins: any existing live handle is replaced. When no
    /// checkpoint exists the registry is left untouched.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::CheckpointNotFound`] when no record exists,
    /// or [`CoreError::CorruptImage`] when the record does not
    /// deserialize.
    pub fn restore_checkpoint(&self, name: &str) -> CoreResult<()> {
        self.ensure_ready()?;
        self.restore_one(name)
    }

    /// Restores every checkpoint under the configured prefix.
    ///
    /// A single corrupt record is recorded in the report and skipped;
    /// restoration of the remaining collections continues.
    ///
    /// # Errors
    ///
    /// Fails only if the store itself cannot be enumerated.
    pub fn restore_all(&self) -> CoreResult<RestoreReport> {
        self.ensure_ready()?;
        self.restore_all_inner()
    }

    /// Replaces the live handle for `name` with one deserialized from a
    /// caller-supplied image.
    ///
    /// Does **not** checkpoint: the caller decides whether the imported
    /// state becomes durable.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::CorruptImage`] when the bytes do not
    /// deserialize; in that case the existing handle is kept.
    pub fn import_from_blob(&self, name: &str, image: &[u8]) -> CoreResult<()> {
        self.ensure_ready()?;
        validate_name(name)?;

        let conn = codec::deserialize_image(image)?;
        self.registry.register(name, conn);
        debug!(collection = %name, bytes = image.len(), "imported collection from blob");
        Ok(())
    }

    /// Serializes the open handle for `name` into an exportable image.
    ///
    /// # Errors
    ///
    /// Fails with `CollectionNotFound` when no handle is open.
    pub fn export_to_blob(&self, name: &str) -> CoreResult<Vec<u8>> {
        self.ensure_ready()?;
        self.registry.with_handle(name, codec::serialize_image)
    }

    /// Idempotent bootstrap: creates `name` with `baseline_sql` only when
    /// neither a live handle nor a checkpoint exists; restores the
    /// checkpoint when unopened. Never overwrites existing data.
    ///
    /// # Errors
    ///
    /// Fails if the baseline SQL is rejected or the store fails.
    pub fn ensure_collection(&self, name: &str, baseline_sql: &str) -> CoreResult<()> {
        self.ensure_ready()?;
        self.ensure_inner(name, baseline_sql)
    }

    /// Closes the live handle (if any) and removes the durable
    /// checkpoint. Irreversible.
    ///
    /// # Errors
    ///
    /// Fails if the store removal fails.
    pub fn delete_collection(&self, name: &str) -> CoreResult<()> {
        self.ensure_ready()?;
        self.registry.close(name);
        self.store.remove(&self.key_for(name))?;
        info!(collection = %name, "collection deleted");
        Ok(())
    }

    /// Runs `f` against the live handle for `name`, restoring it from its
    /// checkpoint first when it is unopened.
    ///
    /// This is the facade's access path; mutating callers follow up with
    /// [`Self::save_checkpoint`].
    ///
    /// # Errors
    ///
    /// Fails with `CollectionNotFound` when the collection neither is
    /// open nor has a checkpoint.
    pub fn with_collection<R>(
        &self,
        name: &str,
        f: impl FnOnce(&Connection) -> CoreResult<R>,
    ) -> CoreResult<R> {
        self.ensure_ready()?;
        if !self.registry.is_open(name) && self.store.get(&self.key_for(name))?.is_some() {
            self.restore_one(name)?;
        }
        self.registry.with_handle(name, f)
    }

    /// Derives the durable-store key for a collection name.
    #[must_use]
    pub fn key_for(&self, name: &str) -> String {
        format!("{}{}", self.config.checkpoint_prefix, name)
    }

    fn ensure_ready(&self) -> CoreResult<()> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(CoreError::NotReady)
        }
    }

    fn write_checkpoint(&self, name: &str) -> CoreResult<()> {
        let image = self.registry.with_handle(name, codec::serialize_image)?;
        self.store.put(&self.key_for(name), &image)?;
        debug!(collection = %name, bytes = image.len(), "checkpoint written");
        Ok(())
    }

    // Checkpoints a not-yet-registered handle, registering it only once
    // the durable write has succeeded.
    fn checkpoint_and_register(&self, name: &str, conn: Connection) -> CoreResult<()> {
        let image = codec::serialize_image(&conn)?;
        self.store.put(&self.key_for(name), &image)?;
        debug!(collection = %name, bytes = image.len(), "checkpoint written");
        self.registry.register(name, conn);
        Ok(())
    }

    fn restore_one(&self, name: &str) -> CoreResult<()> {
        let image = self
            .store
            .get(&self.key_for(name))?
            .ok_or_else(|| CoreError::checkpoint_not_found(name))?;
        let conn = codec::deserialize_image(&image)?;
        self.registry.register(name, conn);
        Ok(())
    }

    fn restore_all_inner(&self) -> CoreResult<RestoreReport> {
        let keys = self.store.keys(&self.config.checkpoint_prefix)?;
        let mut report = RestoreReport::default();
        for key in keys {
            let Some(name) = key.strip_prefix(&self.config.checkpoint_prefix) else {
                continue;
            };
            match self.restore_one(name) {
                Ok(()) => report.restored.push(name.to_string()),
                Err(e) => {
                    warn!(collection = %name, error = %e, "skipping checkpoint that failed to restore");
                    report.failed.push((name.to_string(), e));
                }
            }
        }
        Ok(report)
    }

    fn ensure_inner(&self, name: &str, baseline_sql: &str) -> CoreResult<()> {
        validate_name(name)?;
        if self.registry.is_open(name) {
            return Ok(());
        }
        if self.store.get(&self.key_for(name))?.is_some() {
            return self.restore_one(name);
        }

        let conn = Connection::open_in_memory()?;
        conn.execute_batch(baseline_sql)?;
        self.checkpoint_and_register(name, conn)
    }
}

impl std::fmt::Debug for CheckpointManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckpointManager")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("ready", &self.ready.load(Ordering::Acquire))
            .finish()
    }
}

fn validate_name(name: &str) -> CoreResult<()> {
    let ok = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(CoreError::invalid_name(name))
    }
}
