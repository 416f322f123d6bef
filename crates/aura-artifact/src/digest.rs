//! Content digests for reference images
//!
//! Provides [`ImageDigest`], a 32-byte Blake3 digest used to attribute a
//! generated artifact to the exact reference images it was produced from.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte content digest (Blake3)
///
/// Identical bytes always produce the same digest, so two uploads of the same
/// picture are attributed identically. Immutable and `Copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageDigest([u8; 32]);

impl ImageDigest {
    /// Create a digest from raw bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Create digest from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DigestError> {
        let arr: [u8; 32] = bytes.try_into().map_err(|_| DigestError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Compute Blake3 digest of arbitrary data
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for ImageDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for ImageDigest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

// Persisted as a hex string so stored records stay readable.
impl serde::Serialize for ImageDigest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ImageDigest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when working with digests
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Invalid digest length
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_compute_deterministic() {
        let d1 = ImageDigest::compute(b"subject.png");
        let d2 = ImageDigest::compute(b"subject.png");
        assert_eq!(d1, d2);
        assert_ne!(d1, ImageDigest::compute(b"object.png"));
    }

    #[test]
    fn digest_from_slice_invalid_length() {
        let result = ImageDigest::from_slice(&[1u8; 31]);
        assert!(matches!(
            result,
            Err(DigestError::InvalidLength {
                expected: 32,
                actual: 31
            })
        ));
    }

    #[test]
    fn digest_display_and_parse() {
        let digest = ImageDigest::compute(b"test");
        let parsed: ImageDigest = digest.to_string().parse().unwrap();
        assert_eq!(digest, parsed);
        assert!(digest.to_string().starts_with(&digest.short()));
    }

    #[test]
    fn digest_serde_is_hex_string() {
        let digest = ImageDigest::compute(b"test");
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json.len(), 66);
        let decoded: ImageDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, decoded);
    }
}
