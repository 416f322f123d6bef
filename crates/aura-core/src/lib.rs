//! Aura Core
//!
//! Fan-out orchestration of generation batches, derived artifact pipelines
//! and studio sessions.
//!
//! # Components
//!
//! - [`Orchestrator`]: issues a batch concurrently, settles all, keeps order,
//!   drops failed slots, persists survivors
//! - [`pipelines`]: builders for variation batches, angle sets, Director's
//!   Cut, composites, carousels and marketing copy
//! - [`SessionState`]: per-session value with a validated phase machine
//! - [`Studio`]: facade tying config, store, client and pipelines together
//!
//! # Example
//!
//! ```rust,ignore
//! use aura_core::{Studio, StudioConfig, StudioMode};
//!
//! let studio = Studio::open(StudioConfig::from_toml_file("aura.toml")?.with_env_overrides()).await?;
//! let mut session = studio.new_session(StudioMode::Model);
//! session.inputs.subject = Some(subject);
//! let outcome = studio.generate(&mut session).await?;
//! if outcome.needs_retry() { /* zero artifacts: prompt for retry */ }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod pipelines;
pub mod session;
mod studio;

pub use config::{StudioConfig, API_KEY_VARS};
pub use error::{ConfigError, StudioError};
pub use orchestrator::{
    BatchOutcome, BatchSlot, BatchState, Enrichment, Orchestrator, PayloadMapper, SlotFailure,
};
pub use session::{
    allowed_transitions, validate_transition, SessionInputs, SessionPhase, SessionState,
    StudioMode,
};
pub use studio::{selection_from_ids, Studio};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
