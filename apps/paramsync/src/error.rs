//! Error types shared by the sync engine and the CLI.

use std::path::PathBuf;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors raised while loading configuration or processing a file pair.
///
/// `ConfigLoad` and `Pattern` abort a run before any file is touched. The
/// document variants are scoped to one file pair and are recorded by the
/// orchestrator so a batch can continue.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to load config {}: {message}", path.display())]
    ConfigLoad { path: PathBuf, message: String },

    #[error("failed to read {}: {source}", path.display())]
    DocumentRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    DocumentParse { path: PathBuf, message: String },

    #[error("failed to write {}: {source}", path.display())]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write '{path}': '{blocked_at}' is not a mapping")]
    MergeConflict { path: String, blocked_at: String },

    #[error("invalid glob pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

impl SyncError {
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigLoad {
            path: path.into(),
            message: message.into(),
        }
    }
}
