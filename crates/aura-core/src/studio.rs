//! Studio facade
//!
//! Owns the orchestrator, the store and the directive random source. Every
//! operation takes the caller's [`SessionState`] explicitly and records the
//! run's phase and results on it.

use std::sync::Arc;

use aura_artifact::{Artifact, ArtifactId, Category, LogicalClock};
use aura_client::{ClientError, GeminiClient, GenerationClient};
use aura_prompt::{ColorHint, Selection};
use aura_store::ArtifactStore;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::StudioConfig;
use crate::error::{ConfigError, StudioError};
use crate::orchestrator::{BatchOutcome, BatchSlot, Orchestrator};
use crate::pipelines::{self, AngleSetKind, ContextualRefs};
use crate::session::{SessionPhase, SessionState, StudioMode};

/// Entry point for every generation workflow
pub struct Studio {
    config: StudioConfig,
    orchestrator: Orchestrator,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("config", &self.config)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Open a studio talking to Gemini
    ///
    /// A missing API key is not an error here; generation calls are then
    /// rejected with `StudioError::BatchRejected`.
    ///
    /// # Errors
    /// Returns `StudioError::Config` for invalid configuration
    pub async fn open(config: StudioConfig) -> Result<Self, StudioError> {
        config.validate()?;
        let client = GeminiClient::new(config.gemini.clone()).map_err(|e| match e {
            ClientError::InvalidConfig(reason) => StudioError::Config(ConfigError::Invalid {
                field: "gemini",
                reason,
            }),
            other => StudioError::BatchRejected(other),
        })?;
        Self::with_client(config, Arc::new(client)).await
    }

    /// Open a studio over any generation client
    ///
    /// # Errors
    /// Returns `StudioError::Config` for invalid configuration
    pub async fn with_client(
        config: StudioConfig,
        client: Arc<dyn GenerationClient>,
    ) -> Result<Self, StudioError> {
        config.validate()?;
        let store = match &config.store_dir {
            Some(dir) => ArtifactStore::open(dir.clone(), config.store_capacity).await,
            None => ArtifactStore::in_memory(config.store_capacity),
        };

        let clock = LogicalClock::new();
        if let Some(latest) = store.latest_created_at().await {
            clock.observe(latest);
        }
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        tracing::info!(
            capacity = store.capacity(),
            persistent = store.is_persistent().await,
            "studio ready"
        );

        Ok(Self {
            orchestrator: Orchestrator::new(client, store, Arc::new(clock)),
            config,
            rng: Mutex::new(rng),
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        self.orchestrator.store()
    }

    /// Fresh session for `mode` with the configured defaults
    #[must_use]
    pub fn new_session(&self, mode: StudioMode) -> SessionState {
        SessionState::new(mode, self.config.default_aspect)
    }

    /// Discard `session` and start over in `mode`
    #[must_use]
    pub fn switch_mode(&self, session: SessionState, mode: StudioMode) -> SessionState {
        session.switch_mode(mode, self.config.default_aspect)
    }

    /// Run the session's studio: variations, carousel or copy by mode
    ///
    /// # Errors
    /// - `StudioError::InputInvalid` if required inputs are missing (no call issued)
    /// - `StudioError::BatchRejected` if no call can be issued
    pub async fn generate(&self, session: &mut SessionState) -> Result<BatchOutcome, StudioError> {
        let slots = self.build_for(session);
        let category = session.mode().category();
        self.run(session, slots, category).await
    }

    fn build_for(&self, session: &SessionState) -> Result<Vec<BatchSlot>, StudioError> {
        let inputs = &session.inputs;
        match session.mode() {
            mode @ (StudioMode::Model
            | StudioMode::Product
            | StudioMode::ModelProduct
            | StudioMode::Background) => {
                let mut rng = self.rng.lock();
                pipelines::variation_slots(
                    mode,
                    &session.selection,
                    inputs,
                    session.aspect_ratio,
                    self.config.batch_size,
                    &mut *rng,
                )
            }
            StudioMode::Carousel => {
                let theme = pipelines::carousel::theme_or_core(inputs.theme_color.as_deref());
                let specs = pipelines::kit_slides(inputs.subject.as_ref(), &inputs.products, &theme)?;
                Ok(pipelines::sequence_slots(specs, session.aspect_ratio))
            }
            StudioMode::ContextualCarousel => {
                let missing = || StudioError::input("all three carousel references are required");
                let refs = ContextualRefs {
                    model_with_product: inputs.model_with_product.as_ref().ok_or_else(missing)?,
                    model_only: inputs.model_only.as_ref().ok_or_else(missing)?,
                    product_only: inputs.product_only.as_ref().ok_or_else(missing)?,
                };
                let theme = inputs.theme_color.as_deref().map(ColorHint::from_hex);
                let specs = pipelines::contextual_slides(
                    inputs.context_text.as_deref().unwrap_or_default(),
                    refs,
                    theme.as_ref(),
                )?;
                Ok(pipelines::sequence_slots(specs, session.aspect_ratio))
            }
            StudioMode::Copy => Ok(vec![pipelines::copy_slot(
                inputs.product_name.as_deref(),
                inputs.context_text.as_deref(),
                inputs.audience.as_deref(),
            )?]),
        }
    }

    /// Re-shoot `source` from the standard angle list
    ///
    /// # Errors
    /// See [`Self::generate`]; `source` must be an image artifact
    pub async fn angle_set(
        &self,
        session: &mut SessionState,
        source: &Artifact,
    ) -> Result<BatchOutcome, StudioError> {
        let slots = pipelines::angle_slots(source, AngleSetKind::Standard, self.config.video_narrative);
        self.run(session, slots, source.category()).await
    }

    /// Exhaustive reshoot of `source`
    ///
    /// # Errors
    /// See [`Self::angle_set`]
    pub async fn directors_cut(
        &self,
        session: &mut SessionState,
        source: &Artifact,
    ) -> Result<BatchOutcome, StudioError> {
        let slots =
            pipelines::angle_slots(source, AngleSetKind::DirectorsCut, self.config.video_narrative);
        self.run(session, slots, source.category()).await
    }

    /// Subject from the session interacting with its product references
    ///
    /// Produces zero or one artifact.
    ///
    /// # Errors
    /// `StudioError::InputInvalid` without a subject, without products, or
    /// when references repeat
    pub async fn composite(
        &self,
        session: &mut SessionState,
        interaction: Option<&str>,
        scenario_label: &str,
    ) -> Result<BatchOutcome, StudioError> {
        let slots = session
            .inputs
            .subject
            .as_ref()
            .ok_or_else(|| StudioError::input("a subject image is required"))
            .and_then(|subject| {
                pipelines::composite_slot(
                    subject,
                    &session.inputs.products,
                    interaction,
                    scenario_label,
                    session.aspect_ratio,
                )
            })
            .map(|slot| vec![slot]);
        self.run(session, slots, Category::ModelProduct).await
    }

    /// Stored artifacts, newest first
    pub async fn history(&self) -> Vec<Artifact> {
        self.store().get_all_ordered_desc().await
    }

    pub async fn get(&self, id: ArtifactId) -> Option<Artifact> {
        self.store().get(id).await
    }

    /// Remove an artifact; absent ids are fine
    pub async fn delete(&self, id: ArtifactId) -> bool {
        self.store().delete_by_id(id).await
    }

    pub async fn clear(&self) {
        self.store().clear_all().await;
    }

    /// Idle -> Composing -> InFlight -> terminal, or back to Idle on bad input
    async fn run(
        &self,
        session: &mut SessionState,
        slots: Result<Vec<BatchSlot>, StudioError>,
        category: Category,
    ) -> Result<BatchOutcome, StudioError> {
        session.begin()?;

        let slots = match slots {
            Ok(slots) if slots.is_empty() => Err(StudioError::input("nothing to generate")),
            other => other,
        };
        let slots = match slots {
            Ok(slots) => slots,
            Err(error) => {
                session.transition(SessionPhase::Idle)?;
                return Err(error);
            }
        };
        if let Err(error) = self.orchestrator.ensure_ready() {
            tracing::warn!(%error, "batch rejected before any call");
            session.transition(SessionPhase::AllFailed)?;
            return Err(error);
        }

        session.transition(SessionPhase::InFlight)?;
        match self.orchestrator.run_slots(slots, category).await {
            Ok(outcome) => {
                session.settle(&outcome)?;
                Ok(outcome)
            }
            Err(error) => {
                session.abort()?;
                Err(error)
            }
        }
    }
}

/// Selection helper for callers that only know preset ids
#[must_use]
pub fn selection_from_ids(
    style: Option<&str>,
    scene: Option<&str>,
    custom: Option<&str>,
    color: Option<&str>,
) -> Selection {
    let mut selection = Selection::new();
    if let Some(style) = style {
        selection = selection.with_style(style);
    }
    if let Some(scene) = scene {
        selection = selection.with_scene(scene);
    }
    if let Some(custom) = custom {
        selection = selection.with_custom_text(custom);
    }
    if let Some(color) = color {
        selection = selection.with_color(color);
    }
    selection
}
