//! Aura Prompt Layer
//!
//! Everything needed to turn raw selection state into a request for the
//! generative service.
//!
//! # Components
//!
//! - [`catalog`]: named styles, scenes, palette colors and shot variation lists
//! - [`resolve`]: selection to [`Directive`], with precedence and random fallback
//! - [`compose`]: directive plus [`FixedConstraints`] to [`GenerationRequest`]
//!
//! # Example
//!
//! ```rust,ignore
//! use aura_prompt::{compose, resolve, AspectRatio, DirectiveLabels, Fallback, FixedConstraints, Selection};
//!
//! let selection = Selection::new().with_scene("amalfi_beach");
//! let directive = resolve(&selection, &DirectiveLabels::AVATAR, Fallback::Random, &mut rand::rng());
//! let request = compose(&directive, &FixedConstraints::avatar(), &[subject], AspectRatio::Portrait9x16);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod catalog;
mod composer;
mod directive;

pub use catalog::{ColorSwatch, Preset};
pub use composer::{
    compose, compose_with_notes, AspectRatio, ComposeError, FixedConstraints, GenerationRequest,
    RequestMode, ShotNote,
};
pub use directive::{
    resolve, ColorHint, Directive, DirectiveKind, DirectiveLabels, Fallback, Precedence, Selection,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
