//! Store error types
//!
//! These never reach callers of [`crate::ArtifactStore`]: a failing backend
//! is logged and replaced by the in-memory one.

use std::path::PathBuf;

/// Persistence backend errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing location cannot be opened or written
    #[error("store unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record file exists but cannot be decoded
    #[error("corrupt record {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Record encoding failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unavailable {
            path: path.into(),
            source,
        }
    }

    /// Whether the whole backend should be abandoned
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Corrupt { .. })
    }
}
