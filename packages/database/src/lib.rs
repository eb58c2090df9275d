#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Record store for the crime data API.
//!
//! The query engine never talks to storage directly. It asks a
//! [`RecordStore`] for a point-in-time [`Snapshot`] and computes everything
//! from that immutable view. [`MemoryStore`] is the in-process
//! implementation, loaded from a JSON snapshot document on disk.

pub mod db;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod memory;
pub mod paths;
pub mod snapshot;

use std::sync::Arc;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use snapshot::Snapshot;

/// Errors that can occur while loading or reading the record store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Reading the snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot document is not valid JSON for the expected shape.
    #[error("Snapshot parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot violates a referential or uniqueness invariant.
    #[error("Snapshot integrity error: {message}")]
    Integrity {
        /// Description of what went wrong.
        message: String,
    },

    /// The store cannot serve a snapshot right now.
    #[error("Record store unavailable: {message}")]
    Unavailable {
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of read-only snapshots for the query engine.
///
/// Implementations must hand out immutable snapshots: a request holds its
/// `Arc<Snapshot>` for its whole lifetime and never observes a reload.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot produce a snapshot.
    async fn snapshot(&self) -> Result<Arc<Snapshot>, DbError>;
}
