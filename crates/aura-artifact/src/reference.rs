//! Reference images supplied to a generation call

use crate::digest::ImageDigest;
use crate::ArtifactError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::sync::Arc;

/// Image bytes plus MIME type, shared cheaply across the requests of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceImage {
    bytes: Arc<[u8]>,
    mime_type: String,
    digest: ImageDigest,
}

impl ReferenceImage {
    /// Create reference image
    ///
    /// # Errors
    /// - `ArtifactError::InvalidReference` if `bytes` is empty or the MIME type is not `image/*`
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Result<Self, ArtifactError> {
        let bytes = bytes.into();
        let mime_type = mime_type.into();

        if bytes.is_empty() {
            return Err(ArtifactError::InvalidReference("empty image".to_string()));
        }
        if !mime_type.starts_with("image/") {
            return Err(ArtifactError::InvalidReference(format!(
                "unsupported mime type '{mime_type}'"
            )));
        }

        let digest = ImageDigest::compute(&bytes);
        Ok(Self {
            bytes,
            mime_type,
            digest,
        })
    }

    /// Raw bytes
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type
    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Content digest used for provenance
    #[inline]
    #[must_use]
    pub fn digest(&self) -> ImageDigest {
        self.digest
    }

    /// Base64 body for inline transport
    #[must_use]
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_rejects_empty_and_non_images() {
        assert!(ReferenceImage::new(Vec::new(), "image/png").is_err());
        assert!(ReferenceImage::new(vec![1, 2], "application/pdf").is_err());
        assert!(ReferenceImage::new(vec![1, 2], "image/webp").is_ok());
    }

    #[test]
    fn clones_share_bytes_and_digest() {
        let reference = ReferenceImage::new(vec![9; 64], "image/png").unwrap();
        let clone = reference.clone();
        assert_eq!(reference.digest(), clone.digest());
        assert_eq!(reference.bytes().as_ptr(), clone.bytes().as_ptr());
    }
}
