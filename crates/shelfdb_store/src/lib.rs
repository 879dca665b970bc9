//! # ShelfDB Store
//!
//! Durable key-value store trait and implementations for ShelfDB.
//!
//! This crate provides the lowest-level persistence abstraction for ShelfDB.
//! Stores are **opaque byte stores** keyed by strings - they do not interpret
//! the values they hold. ShelfDB owns all value format interpretation
//! (checkpoint images, key derivation).
//!
//! ## Design Principles
//!
//! - Stores are simple keyed byte stores (get, put, remove, keys)
//! - No knowledge of collections, checkpoints, or database images
//! - A per-value size ceiling is enforced by `put` - oversized values fail
//!   with [`StoreError::ValueTooLarge`], they are never truncated
//! - Must be `Send + Sync` so one store can back a process-wide manager
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral storage
//! - [`DirStore`] - One file per key under a directory
//!
//! ## Example
//!
//! ```rust
//! use shelfdb_store::{DurableStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.put("checkpoint_notes", b"image bytes").unwrap();
//! let value = store.get("checkpoint_notes").unwrap();
//! assert_eq!(value.as_deref(), Some(&b"image bytes"[..]));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod dir;
mod error;
mod memory;
mod store;

pub use dir::DirStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{DurableStore, DEFAULT_MAX_VALUE_SIZE};
