//! Aura Artifact Store
//!
//! Bounded, ordered collection of generated artifacts.
//!
//! # Guarantees
//!
//! - after every write, `len() <= capacity()`; the oldest by `created_at`
//!   (ties: earliest insertion) are evicted first
//! - reads are ordered newest first regardless of insertion order
//! - an unavailable or failing backend degrades to memory, never to an error
//!
//! # Example
//!
//! ```rust,ignore
//! use aura_store::ArtifactStore;
//!
//! let store = ArtifactStore::open("./.aura/history", 25).await;
//! let outcome = store.put_many(artifacts).await;
//! for artifact in store.get_all_ordered_desc().await { /* newest first */ }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
mod error;
mod store;

pub use backend::{Backend, FileBackend, LoadReport, MemoryBackend, StoredRecord};
pub use error::StoreError;
pub use store::{ArtifactStore, WriteOutcome, DEFAULT_CAPACITY};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
