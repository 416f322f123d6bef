//! Client error types
//!
//! [`CallFailure`] is the outcome of one call that produced no payload.
//! [`ClientError`] means the client cannot issue calls at all.

/// Why a single generation call produced no payload
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallFailure {
    /// Prompt or output blocked by the service's safety filters
    #[error("blocked by content policy: {0}")]
    ContentPolicy(String),

    /// Rate limit or quota exhausted
    #[error("quota exhausted")]
    Quota,

    /// Credential rejected by the service
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Network-level fault
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success status not covered above
    #[error("service returned {status}: {message}")]
    Service { status: u16, message: String },

    /// Service answered but returned no usable payload
    #[error("empty result")]
    EmptyResult,

    /// Response could not be decoded
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Call exceeded the configured timeout
    #[error("call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Call panicked instead of returning
    #[error("call panicked: {0}")]
    Panicked(String),
}

impl CallFailure {
    /// Check if a caller-side retry could plausibly succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Quota | Self::Transport(_) | Self::EmptyResult | Self::Timeout { .. } => true,
            Self::Service { status, .. } => *status >= 500,
            Self::ContentPolicy(_)
            | Self::Unauthorized(_)
            | Self::Malformed(_)
            | Self::Panicked(_) => false,
        }
    }

    /// Short machine-readable reason, used in logs and batch reports
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::ContentPolicy(_) => "content_policy",
            Self::Quota => "quota",
            Self::Unauthorized(_) => "unauthorized",
            Self::Transport(_) => "transport",
            Self::Service { .. } => "service",
            Self::EmptyResult => "empty_result",
            Self::Malformed(_) => "malformed",
            Self::Timeout { .. } => "timeout",
            Self::Panicked(_) => "panicked",
        }
    }
}

/// Client cannot issue any call
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// No API key configured
    #[error("missing credential: set GEMINI_API_KEY or API_KEY")]
    MissingCredential,

    /// Configuration rejected
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction failed
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}
