//! Snapshot loading utilities.

use std::path::{Path, PathBuf};

use crime_data_database_models::SnapshotDocument;

use crate::{DbError, Snapshot, paths};

/// Environment variable naming the snapshot document to serve.
pub const SNAPSHOT_ENV: &str = "CRIME_DATA_SNAPSHOT";

/// Reads, parses, and validates a JSON snapshot document.
///
/// # Errors
///
/// Returns [`DbError`] if the file cannot be read, is not a valid snapshot
/// document, or violates a referential invariant.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, DbError> {
    log::info!("Loading snapshot from {}", path.display());
    let bytes = std::fs::read(path)?;
    let doc: SnapshotDocument = serde_json::from_slice(&bytes)?;
    Snapshot::from_document(doc)
}

/// Returns the snapshot path from `CRIME_DATA_SNAPSHOT`, falling back to
/// `data/snapshot.json` under the project root.
#[must_use]
pub fn snapshot_path_from_env() -> PathBuf {
    std::env::var_os(SNAPSHOT_ENV).map_or_else(paths::snapshot_path, PathBuf::from)
}
