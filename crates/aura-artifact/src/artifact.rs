//! The artifact record
//!
//! Defines [`Artifact`], the unit of generated output persisted by the store.
//! Identity (`id`), `category` and `created_at` are fixed at construction;
//! only the derived video narrative may be attached afterwards.

use crate::category::Category;
use crate::clock::LogicalTimestamp;
use crate::digest::ImageDigest;
use crate::payload::Payload;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique artifact identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    /// Generate new random (v4) id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ArtifactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArtifactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Position of a slide within an ordered multi-slide sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideTag {
    /// 1-based position in the sequence
    pub position: usize,
    /// Slide label as defined by the sequence
    pub label: String,
}

impl SlideTag {
    /// Create slide tag
    #[inline]
    #[must_use]
    pub fn new(position: usize, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
        }
    }
}

/// Errors related to artifact construction
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    /// Payload kind does not match the category
    #[error("payload mismatch: category {category} cannot carry a {payload} payload")]
    PayloadMismatch {
        category: Category,
        payload: &'static str,
    },

    /// Reference image rejected
    #[error("invalid reference image: {0}")]
    InvalidReference(String),
}

/// One generated output
///
/// # Invariants
/// - `id` is unique and never changes
/// - `category` is set exactly once, here
/// - visual categories carry an image payload, `Copy` carries a copy bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    id: ArtifactId,
    category: Category,
    payload: Payload,
    prompt_summary: String,
    scenario_label: String,
    created_at: LogicalTimestamp,
    created_wall: DateTime<Utc>,
    #[serde(default)]
    references: Vec<ImageDigest>,
    #[serde(default)]
    slide: Option<SlideTag>,
    #[serde(default)]
    derived_video_narrative: Option<String>,
}

impl Artifact {
    /// Create new artifact with a fresh id
    ///
    /// # Errors
    /// Returns `ArtifactError::PayloadMismatch` if the payload kind does not fit the category
    pub fn new(
        category: Category,
        payload: Payload,
        created_at: LogicalTimestamp,
    ) -> Result<Self, ArtifactError> {
        let payload_kind = match &payload {
            Payload::Image(_) => "image",
            Payload::Copy(_) => "copy",
        };
        if category.is_visual() != matches!(payload, Payload::Image(_)) {
            return Err(ArtifactError::PayloadMismatch {
                category,
                payload: payload_kind,
            });
        }

        Ok(Self {
            id: ArtifactId::new(),
            category,
            payload,
            prompt_summary: String::new(),
            scenario_label: String::new(),
            created_at,
            created_wall: Utc::now(),
            references: Vec::new(),
            slide: None,
            derived_video_narrative: None,
        })
    }

    /// With prompt summary
    #[inline]
    #[must_use]
    pub fn with_prompt_summary(mut self, summary: impl Into<String>) -> Self {
        self.prompt_summary = summary.into();
        self
    }

    /// With scenario label
    #[inline]
    #[must_use]
    pub fn with_scenario_label(mut self, label: impl Into<String>) -> Self {
        self.scenario_label = label.into();
        self
    }

    /// With digests of the reference images used
    #[inline]
    #[must_use]
    pub fn with_references(mut self, references: Vec<ImageDigest>) -> Self {
        self.references = references;
        self
    }

    /// With slide identity
    #[inline]
    #[must_use]
    pub fn with_slide(mut self, slide: SlideTag) -> Self {
        self.slide = Some(slide);
        self
    }

    /// Attach narrative text produced by a secondary enrichment call
    #[inline]
    pub fn attach_video_narrative(&mut self, narrative: impl Into<String>) {
        self.derived_video_narrative = Some(narrative.into());
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> ArtifactId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    #[must_use]
    pub fn prompt_summary(&self) -> &str {
        &self.prompt_summary
    }

    #[inline]
    #[must_use]
    pub fn scenario_label(&self) -> &str {
        &self.scenario_label
    }

    /// Ordering key; not a wall-clock guarantee
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> LogicalTimestamp {
        self.created_at
    }

    /// Wall-clock time of creation, informational only
    #[inline]
    #[must_use]
    pub fn created_wall(&self) -> DateTime<Utc> {
        self.created_wall
    }

    /// Digests of the reference images this artifact was generated from
    #[inline]
    #[must_use]
    pub fn references(&self) -> &[ImageDigest] {
        &self.references
    }

    #[inline]
    #[must_use]
    pub fn slide(&self) -> Option<&SlideTag> {
        self.slide.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn derived_video_narrative(&self) -> Option<&str> {
        self.derived_video_narrative.as_deref()
    }
}
