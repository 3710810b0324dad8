//! Error types for history persistence.

use thiserror::Error;

/// Errors produced while saving the history collection.
///
/// Loading never fails: corrupt or missing data yields an empty collection.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// I/O error writing the history file to disk.
    #[error("I/O error writing history: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (shouldn't occur for well-formed entries).
    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
