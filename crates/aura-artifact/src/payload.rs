//! Artifact payloads
//!
//! An artifact carries either image bytes or a structured marketing-copy
//! bundle. Image bytes are persisted as base64 so stored records are plain JSON.

use crate::reference::ReferenceImage;
use crate::ArtifactError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Generated output carried by an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    /// Encoded image
    Image(ImagePayload),
    /// Marketing copy sections
    Copy(CopyBundle),
}

impl Payload {
    /// Image payload, if any
    #[inline]
    #[must_use]
    pub fn as_image(&self) -> Option<&ImagePayload> {
        match self {
            Payload::Image(image) => Some(image),
            Payload::Copy(_) => None,
        }
    }

    /// Copy payload, if any
    #[inline]
    #[must_use]
    pub fn as_copy(&self) -> Option<&CopyBundle> {
        match self {
            Payload::Copy(copy) => Some(copy),
            Payload::Image(_) => None,
        }
    }
}

/// Encoded image bytes with their MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    /// MIME type reported by the service (`image/png` when absent)
    pub mime_type: String,
    /// Raw image bytes
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

impl ImagePayload {
    /// Create image payload
    #[inline]
    #[must_use]
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// `data:` URL suitable for direct display
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }

    /// Reuse this image as a reference for a derived generation
    ///
    /// # Errors
    /// Returns error if the payload is empty or not an image MIME type
    pub fn to_reference(&self) -> Result<ReferenceImage, ArtifactError> {
        ReferenceImage::new(self.bytes.clone(), self.mime_type.clone())
    }
}

/// Marketing copy produced by a text-mode call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyBundle {
    /// Product the copy was written for
    pub product_name: String,
    /// Email strategy section
    pub email_content: String,
    /// Social media scripts section
    pub social_content: String,
    /// Sales page section
    pub sales_page_content: String,
    /// Sources the service grounded the copy on
    #[serde(default)]
    pub grounding_links: Vec<GroundingLink>,
}

/// One web source used for grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    /// Source URI
    pub uri: String,
    /// Source title (may be empty)
    #[serde(default)]
    pub title: String,
}

mod base64_bytes {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
