//! # ShelfDB Core
//!
//! Collection lifecycle and checkpoint persistence for ShelfDB.
//!
//! ShelfDB presents callers with independently named, continuously
//! available relational databases ("collections") inside a host process
//! that may be torn down at any time. Each collection is an in-memory
//! SQLite handle; durability comes from checkpointing full binary images
//! into a [`shelfdb_store::DurableStore`].
//!
//! This crate provides:
//! - Binary image codec (live handle <-> checkpoint image)
//! - Collection registry (name -> live handle)
//! - Checkpoint manager (create / save / restore / import / export /
//!   ensure / delete, gated behind startup restoration)
//! - Schema & query facade (introspection, row listing, raw execution)
//!
//! ## Example
//!
//! ```rust
//! use shelfdb_core::{CheckpointManager, Config, QueryFacade};
//! use shelfdb_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let manager = Arc::new(CheckpointManager::new(
//!     Arc::new(MemoryStore::new()),
//!     Config::default(),
//! ));
//! manager.initialize().unwrap();
//!
//! let facade = QueryFacade::new(Arc::clone(&manager));
//! let schema = facade.schema("packets").unwrap();
//! assert_eq!(schema[0].name, "packets");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod config;
mod error;
mod facade;
mod manager;
mod registry;

pub use codec::{deserialize_image, serialize_image};
pub use config::{Config, CHECKPOINT_PREFIX};
pub use error::{CoreError, CoreResult};
pub use facade::{ExecOutcome, QueryFacade, ResultSet, SchemaObject};
pub use manager::{
    CheckpointManager, CollectionState, RestoreReport, PACKETS_BASELINE_SQL, PACKETS_COLLECTION,
    SCHEMAS_BASELINE_SQL, SCHEMAS_COLLECTION,
};
pub use registry::CollectionRegistry;

// The engine type behind live handles, re-exported for callers that run
// parameter-bound statements through `CheckpointManager::with_collection`.
pub use rusqlite;
