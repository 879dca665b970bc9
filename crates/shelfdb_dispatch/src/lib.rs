//! # ShelfDB Dispatch
//!
//! Request dispatch for ShelfDB.
//!
//! This crate is the caller-facing surface: a closed [`Request`] enum
//! (tagged `action` JSON on the wire), a [`Dispatcher`] that matches it
//! exhaustively against manager and facade operations, and the
//! reserved-collection domain operations (packet CRUD, schema-library
//! CRUD) executed as parameter-bound statements.
//!
//! Errors never cross the boundary as panics: each becomes a
//! [`Failure`] with a machine-readable kind and a human-readable
//! message.
//!
//! ## Example
//!
//! ```rust
//! use shelfdb_core::{CheckpointManager, Config};
//! use shelfdb_dispatch::{Dispatcher, Reply, Request};
//! use shelfdb_store::MemoryStore;
//! use std::sync::Arc;
//!
//! let manager = Arc::new(CheckpointManager::new(
//!     Arc::new(MemoryStore::new()),
//!     Config::default(),
//! ));
//! manager.initialize().unwrap();
//!
//! let dispatcher = Dispatcher::new(manager);
//! let reply = dispatcher.handle(Request::ListCollections).unwrap();
//! assert!(matches!(reply, Reply::Collections { .. }));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod handler;
mod reply;
mod request;
mod reserved;

pub use handler::Dispatcher;
pub use reply::{DispatchResult, Failure, FailureKind, Packet, Reply, SavedSchema};
pub use request::Request;
pub use reserved::{
    delete_packet, delete_schema, list_packets, list_schemas, save_packet, save_schema,
};
