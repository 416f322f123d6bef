//! Aura Artifact Model
//!
//! Typed records for everything the generation core produces and consumes.
//!
//! # Core Concepts
//!
//! - [`Artifact`]: one persisted unit of generated output (image or copy bundle)
//! - [`Category`]: immutable tag deciding which pipelines apply
//! - [`LogicalClock`]: strictly increasing `created_at` source
//! - [`ReferenceImage`]: input image shared across the calls of a batch
//! - [`ImageDigest`]: Blake3 digest used to attribute outputs to their inputs
//!
//! # Example
//!
//! ```rust,ignore
//! use aura_artifact::{Artifact, Category, ImagePayload, LogicalClock, Payload};
//!
//! let clock = LogicalClock::new();
//! let artifact = Artifact::new(
//!     Category::Avatar,
//!     Payload::Image(ImagePayload::new("image/png", bytes)),
//!     clock.tick(),
//! )?
//! .with_scenario_label("Studio Session");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod category;
mod clock;
mod digest;
mod payload;
mod reference;

pub use artifact::{Artifact, ArtifactError, ArtifactId, SlideTag};
pub use category::{Category, UnknownCategory};
pub use clock::{LogicalClock, LogicalTimestamp};
pub use digest::{DigestError, ImageDigest};
pub use payload::{CopyBundle, GroundingLink, ImagePayload, Payload};
pub use reference::ReferenceImage;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
