//! Generation session state
//!
//! One [`SessionState`] value carries everything a studio run needs: mode,
//! selection, reference inputs, aspect ratio and the phase of the last run.
//! Switching mode discards the value and builds a fresh one.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use aura_artifact::{Artifact, Category, ReferenceImage};
use aura_prompt::{AspectRatio, Selection};
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::orchestrator::{BatchOutcome, BatchState};

/// Which studio the session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudioMode {
    /// Fashion portraits of the subject (avatar artifacts)
    Model,
    Product,
    ModelProduct,
    Background,
    Carousel,
    ContextualCarousel,
    Copy,
}

impl StudioMode {
    pub const ALL: [Self; 7] = [
        Self::Model,
        Self::Product,
        Self::ModelProduct,
        Self::Background,
        Self::Carousel,
        Self::ContextualCarousel,
        Self::Copy,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Product => "product",
            Self::ModelProduct => "model_product",
            Self::Background => "background",
            Self::Carousel => "carousel",
            Self::ContextualCarousel => "contextual_carousel",
            Self::Copy => "copy",
        }
    }

    /// Category of artifacts the mode produces
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            Self::Model => Category::Avatar,
            Self::Product => Category::Product,
            Self::ModelProduct => Category::ModelProduct,
            Self::Background => Category::Background,
            Self::Carousel | Self::ContextualCarousel => Category::Carousel,
            Self::Copy => Category::Copy,
        }
    }

    /// Aspect ratio a fresh session starts with
    #[must_use]
    pub fn initial_aspect(self, configured: AspectRatio) -> AspectRatio {
        match self {
            Self::ContextualCarousel => AspectRatio::Portrait3x4,
            _ => configured,
        }
    }
}

impl Display for StudioMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StudioMode {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| StudioError::input(format!("unknown studio mode '{s}'")))
    }
}

/// Phase of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Composing,
    InFlight,
    Complete,
    PartialComplete,
    /// Request set rejected before any call was issued
    AllFailed,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::PartialComplete | Self::AllFailed)
    }

    /// Terminal phase matching a settled batch
    #[must_use]
    pub fn from_batch(state: BatchState) -> Self {
        match state {
            BatchState::Complete => Self::Complete,
            BatchState::PartialComplete => Self::PartialComplete,
        }
    }
}

/// Phases reachable from `from`
#[must_use]
pub fn allowed_transitions(from: SessionPhase) -> Vec<SessionPhase> {
    use SessionPhase::{AllFailed, Complete, Composing, Idle, InFlight, PartialComplete};
    match from {
        Idle | Complete | PartialComplete | AllFailed => vec![Composing],
        // input rejected while composing returns to idle
        Composing => vec![InFlight, AllFailed, Idle],
        InFlight => vec![Complete, PartialComplete],
    }
}

/// Validate a phase transition
///
/// # Errors
/// Returns `StudioError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: SessionPhase, to: SessionPhase) -> Result<(), StudioError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(StudioError::IllegalTransition { from, to })
    }
}

/// Reference material and text inputs gathered by the UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionInputs {
    /// Subject photo (model studio, model x product)
    pub subject: Option<ReferenceImage>,
    /// Product photos
    pub products: Vec<ReferenceImage>,
    /// Contextual carousel: model already holding the product
    pub model_with_product: Option<ReferenceImage>,
    /// Contextual carousel: model alone
    pub model_only: Option<ReferenceImage>,
    /// Contextual carousel: product alone
    pub product_only: Option<ReferenceImage>,
    /// Carousel context, or product benefits for copy
    pub context_text: Option<String>,
    /// Carousel theme color (hex)
    pub theme_color: Option<String>,
    pub product_name: Option<String>,
    pub audience: Option<String>,
}

/// Per-session value passed explicitly between studio calls
#[derive(Debug, Clone)]
pub struct SessionState {
    mode: StudioMode,
    pub selection: Selection,
    pub aspect_ratio: AspectRatio,
    pub inputs: SessionInputs,
    phase: SessionPhase,
    last_results: Vec<Artifact>,
    needs_retry: bool,
}

impl SessionState {
    /// Create fresh session for a mode
    #[must_use]
    pub fn new(mode: StudioMode, default_aspect: AspectRatio) -> Self {
        Self {
            mode,
            selection: Selection::default(),
            aspect_ratio: mode.initial_aspect(default_aspect),
            inputs: SessionInputs::default(),
            phase: SessionPhase::Idle,
            last_results: Vec::new(),
            needs_retry: false,
        }
    }

    /// Discard this session and start a new one in `mode`
    #[must_use]
    pub fn switch_mode(self, mode: StudioMode, default_aspect: AspectRatio) -> Self {
        Self::new(mode, default_aspect)
    }

    #[inline]
    #[must_use]
    pub fn mode(&self) -> StudioMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Transient result view of the last run
    #[inline]
    #[must_use]
    pub fn last_results(&self) -> &[Artifact] {
        &self.last_results
    }

    /// Last run issued calls but produced nothing
    #[inline]
    #[must_use]
    pub fn needs_retry(&self) -> bool {
        self.needs_retry
    }

    #[inline]
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_inputs(mut self, inputs: SessionInputs) -> Self {
        self.inputs = inputs;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_aspect_ratio(mut self, aspect: AspectRatio) -> Self {
        self.aspect_ratio = aspect;
        self
    }

    /// Move to `to`, validating the edge
    ///
    /// # Errors
    /// Returns `StudioError::IllegalTransition` for a forbidden edge
    pub fn transition(&mut self, to: SessionPhase) -> Result<(), StudioError> {
        validate_transition(self.phase, to)?;
        tracing::trace!(from = ?self.phase, ?to, "session transition");
        self.phase = to;
        Ok(())
    }

    /// Start a run: clears the previous result view
    pub(crate) fn begin(&mut self) -> Result<(), StudioError> {
        self.transition(SessionPhase::Composing)?;
        self.last_results.clear();
        self.needs_retry = false;
        Ok(())
    }

    /// Record a settled batch
    pub(crate) fn settle(&mut self, outcome: &BatchOutcome) -> Result<(), StudioError> {
        self.transition(SessionPhase::from_batch(outcome.state))?;
        self.last_results = outcome.artifacts.clone();
        self.needs_retry = outcome.needs_retry();
        Ok(())
    }

    /// Record a batch that never settled: nothing to show, retry suggested
    pub(crate) fn abort(&mut self) -> Result<(), StudioError> {
        self.transition(SessionPhase::PartialComplete)?;
        self.last_results.clear();
        self.needs_retry = true;
        Ok(())
    }
}
