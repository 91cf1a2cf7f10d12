//! Snapshot error types.

use thiserror::Error;

/// Errors that can occur when saving or loading a store snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// Failed to read or write the snapshot file.
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot is not valid JSON for this store.
    #[error("Snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
