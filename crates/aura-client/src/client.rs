//! Generation client capability

use aura_artifact::GroundingLink;
use aura_prompt::GenerationRequest;

use crate::error::{CallFailure, ClientError};

/// What a successful call returns
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedPayload {
    Image {
        bytes: Vec<u8>,
        mime_type: String,
    },
    Text {
        text: String,
        /// Parsed JSON when the request carried a response schema and the reply parsed
        structured: Option<serde_json::Value>,
        grounding: Vec<GroundingLink>,
    },
}

impl GeneratedPayload {
    #[must_use]
    pub fn is_image(&self) -> bool {
        matches!(self, Self::Image { .. })
    }

    /// Text body of a text payload
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Image { .. } => None,
        }
    }
}

/// Capability interface to the external generative service
///
/// One call, one composed request, zero-or-one payload. Implementations
/// never retry internally; retry policy belongs to callers.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Check that calls can be issued at all (credentials present, config sane)
    ///
    /// # Errors
    /// Returns `ClientError` when no call could succeed
    fn ensure_ready(&self) -> Result<(), ClientError>;

    /// Issue one generation call
    ///
    /// # Errors
    /// Returns `CallFailure` when the call produced no payload
    async fn invoke(&self, request: &GenerationRequest) -> Result<GeneratedPayload, CallFailure>;
}
