//! Data models for sync configuration, diffs, and run reporting.

pub mod diff;
pub mod sync_policy;

use serde::Serialize;

/// Human-readable error captured during a run without aborting it.
#[derive(Debug, Clone, Serialize)]
pub struct RunError {
    pub message: String,
}

impl From<&crate::error::SyncError> for RunError {
    fn from(e: &crate::error::SyncError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}
