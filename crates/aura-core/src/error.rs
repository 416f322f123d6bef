//! Error types for Aura Core
//!
//! Only batch-level and input failures surface here. Per-call failures are
//! absorbed by the orchestrator and reported inside a batch outcome;
//! persistence failures are absorbed by the store.

use std::path::PathBuf;

use aura_client::ClientError;

use crate::session::SessionPhase;

/// Main studio error type
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Required inputs missing; raised before any network activity
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// No call could be issued at all
    #[error("batch rejected: {0}")]
    BatchRejected(#[from] ClientError),

    /// Session asked to move along an edge the state machine forbids
    #[error("illegal session transition {from:?} -> {to:?}")]
    IllegalTransition { from: SessionPhase, to: SessionPhase },

    /// Batch task ended without settling (panic or runtime shutdown)
    #[error("batch aborted: {0}")]
    Aborted(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StudioError {
    #[inline]
    pub fn input(reason: impl Into<String>) -> Self {
        Self::InputInvalid(reason.into())
    }

    /// Check if the error must be shown to the user as a failure
    #[inline]
    #[must_use]
    pub fn is_hard(&self) -> bool {
        !matches!(self, Self::InputInvalid(_))
    }

    /// Check if retrying the same action could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(!StudioError::input("no subject").is_hard());
        assert!(StudioError::BatchRejected(ClientError::MissingCredential).is_hard());
        assert!(StudioError::Aborted("panic".into()).is_retryable());
        assert!(!StudioError::BatchRejected(ClientError::MissingCredential).is_retryable());
    }
}
