//! In-process record store backed by an immutable snapshot.

use std::path::Path;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{DbError, RecordStore, Snapshot, db};

/// Record store that serves a snapshot held in memory.
///
/// The current snapshot sits behind an `RwLock<Arc<_>>`. Readers clone the
/// `Arc` and release the lock immediately, so [`MemoryStore::replace`]
/// never blocks on an in-flight aggregation and in-flight requests keep
/// the snapshot they started with.
#[derive(Debug)]
pub struct MemoryStore {
    current: RwLock<Arc<Snapshot>>,
}

impl MemoryStore {
    /// Creates a store serving `snapshot`.
    #[must_use]
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Loads a store from a JSON snapshot document on disk.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        Ok(Self::new(db::load_snapshot(path)?))
    }

    /// Atomically swaps in a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Unavailable`] if the lock is poisoned.
    pub fn replace(&self, snapshot: Snapshot) -> Result<(), DbError> {
        let mut guard = self.current.write().map_err(|e| DbError::Unavailable {
            message: format!("snapshot lock poisoned: {e}"),
        })?;
        *guard = Arc::new(snapshot);
        log::info!("Replaced record store snapshot");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn snapshot(&self) -> Result<Arc<Snapshot>, DbError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|e| DbError::Unavailable {
                message: format!("snapshot lock poisoned: {e}"),
            })
    }
}
