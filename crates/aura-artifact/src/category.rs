//! Artifact categories
//!
//! The category tag decides which pipelines apply to an artifact (angle lists,
//! identity rules). It is fixed when the artifact is created.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Kind of generated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Subject (person) restyled into a lifestyle scene
    Avatar,
    /// Product-only commercial shot
    Product,
    /// Subject interacting with products
    ModelProduct,
    /// One slide of an ordered carousel
    Carousel,
    /// Backdrop plate without subject or product
    Background,
    /// Generated marketing text
    Copy,
}

impl Category {
    /// All categories, in declaration order
    pub const ALL: [Category; 6] = [
        Category::Avatar,
        Category::Product,
        Category::ModelProduct,
        Category::Carousel,
        Category::Background,
        Category::Copy,
    ];

    /// Stable identifier used in persisted records and on the CLI
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Avatar => "avatar",
            Category::Product => "product",
            Category::ModelProduct => "model_product",
            Category::Carousel => "carousel",
            Category::Background => "background",
            Category::Copy => "copy",
        }
    }

    /// Whether artifacts of this category carry an image payload
    #[inline]
    #[must_use]
    pub const fn is_visual(self) -> bool {
        !matches!(self, Category::Copy)
    }

    /// Whether a human subject's identity must be preserved
    #[inline]
    #[must_use]
    pub const fn features_subject(self) -> bool {
        matches!(self, Category::Avatar | Category::ModelProduct)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Returned when parsing an unknown category name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: '{0}'")]
pub struct UnknownCategory(pub String);
