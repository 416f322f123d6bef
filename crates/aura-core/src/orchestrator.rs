//! Fan-out orchestrator
//!
//! Issues every slot of a batch concurrently and waits for all of them to
//! settle. A failed call removes its slot from the result; it never aborts
//! siblings and never surfaces as an error. A call that panics is caught at
//! its slot and reported as [`CallFailure::Panicked`].
//!
//! The batch runs on its own task: if the caller stops waiting, in-flight
//! calls still finish and their artifacts are still persisted.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use aura_artifact::{Artifact, ArtifactId, Category, ImagePayload, LogicalClock, Payload, SlideTag};
use aura_client::{CallFailure, GeneratedPayload, GenerationClient};
use aura_prompt::GenerationRequest;
use aura_store::ArtifactStore;
use futures::future::join_all;
use futures::FutureExt;
use tracing::Instrument;
use ulid::Ulid;

use crate::error::StudioError;

/// Converts a successful call's payload into an artifact payload
pub type PayloadMapper =
    Box<dyn FnOnce(GeneratedPayload) -> Result<Payload, CallFailure> + Send + 'static>;

/// Text produced by a secondary call, or `None` when it failed
pub type EnrichmentRender = fn(Option<&str>) -> String;

/// Secondary text call run alongside a slot's main call
pub struct Enrichment {
    pub request: GenerationRequest,
    pub render: EnrichmentRender,
}

impl std::fmt::Debug for Enrichment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enrichment")
            .field("request", &self.request.mode())
            .finish_non_exhaustive()
    }
}

/// One call of a batch plus the provenance its artifact will carry
pub struct BatchSlot {
    request: GenerationRequest,
    prompt_summary: String,
    scenario_label: String,
    slide: Option<SlideTag>,
    enrichment: Option<Enrichment>,
    mapper: PayloadMapper,
}

impl std::fmt::Debug for BatchSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSlot")
            .field("prompt_summary", &self.prompt_summary)
            .field("scenario_label", &self.scenario_label)
            .field("slide", &self.slide)
            .field("enrichment", &self.enrichment)
            .finish_non_exhaustive()
    }
}

impl BatchSlot {
    /// Create slot expecting an image payload
    #[must_use]
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            request,
            prompt_summary: String::new(),
            scenario_label: String::new(),
            slide: None,
            enrichment: None,
            mapper: Box::new(image_payload),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_prompt_summary(mut self, summary: impl Into<String>) -> Self {
        self.prompt_summary = summary.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_scenario_label(mut self, label: impl Into<String>) -> Self {
        self.scenario_label = label.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_slide(mut self, slide: SlideTag) -> Self {
        self.slide = Some(slide);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_enrichment(mut self, enrichment: Enrichment) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// Replace the payload conversion (text-mode pipelines)
    #[inline]
    #[must_use]
    pub fn with_mapper(
        mut self,
        mapper: impl FnOnce(GeneratedPayload) -> Result<Payload, CallFailure> + Send + 'static,
    ) -> Self {
        self.mapper = Box::new(mapper);
        self
    }

    #[inline]
    #[must_use]
    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    #[inline]
    #[must_use]
    pub fn slide(&self) -> Option<&SlideTag> {
        self.slide.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn scenario_label(&self) -> &str {
        &self.scenario_label
    }

    #[inline]
    #[must_use]
    pub fn prompt_summary(&self) -> &str {
        &self.prompt_summary
    }

    #[inline]
    #[must_use]
    pub fn enrichment(&self) -> Option<&Enrichment> {
        self.enrichment.as_ref()
    }
}

impl From<GenerationRequest> for BatchSlot {
    fn from(request: GenerationRequest) -> Self {
        Self::new(request)
    }
}

fn image_payload(payload: GeneratedPayload) -> Result<Payload, CallFailure> {
    match payload {
        GeneratedPayload::Image { bytes, mime_type } if !bytes.is_empty() => {
            Ok(Payload::Image(ImagePayload::new(mime_type, bytes)))
        }
        GeneratedPayload::Image { .. } => Err(CallFailure::EmptyResult),
        GeneratedPayload::Text { .. } => {
            Err(CallFailure::Malformed("expected image, got text".into()))
        }
    }
}

/// Terminal state of a settled batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    /// Every slot produced an artifact
    Complete,
    /// Some (possibly all) slots failed
    PartialComplete,
}

/// A slot that produced nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFailure {
    /// Position in the submitted batch
    pub index: usize,
    pub slide: Option<SlideTag>,
    pub failure: CallFailure,
}

/// Result of one batch
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub batch_id: Ulid,
    pub category: Category,
    pub requested: usize,
    /// Successful artifacts in submission order, failed slots omitted
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<SlotFailure>,
    pub state: BatchState,
    /// Whether the store write reached durable storage
    pub persisted: bool,
    /// Ids the store evicted to make room
    pub evicted: Vec<ArtifactId>,
}

impl BatchOutcome {
    /// Calls were issued but none produced an artifact
    #[inline]
    #[must_use]
    pub fn needs_retry(&self) -> bool {
        self.requested > 0 && self.artifacts.is_empty()
    }
}

struct SlotSuccess {
    payload: Payload,
    narrative: Option<String>,
}

/// Fan-out executor shared by every pipeline
#[derive(Clone)]
pub struct Orchestrator {
    client: Arc<dyn GenerationClient>,
    store: ArtifactStore,
    clock: Arc<LogicalClock>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("store", &self.store)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create new orchestrator
    #[must_use]
    pub fn new(
        client: Arc<dyn GenerationClient>,
        store: ArtifactStore,
        clock: Arc<LogicalClock>,
    ) -> Self {
        Self {
            client,
            store,
            clock,
        }
    }

    #[inline]
    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn client(&self) -> &Arc<dyn GenerationClient> {
        &self.client
    }

    /// Check that calls can be issued, without issuing any
    ///
    /// # Errors
    /// Returns `StudioError::BatchRejected` when the client is not ready
    pub fn ensure_ready(&self) -> Result<(), StudioError> {
        self.client.ensure_ready().map_err(StudioError::BatchRejected)
    }

    /// Run plain requests as one batch
    ///
    /// # Errors
    /// See [`Self::run_slots`]
    pub async fn run_batch(
        &self,
        requests: Vec<GenerationRequest>,
        category: Category,
    ) -> Result<BatchOutcome, StudioError> {
        self.run_slots(requests.into_iter().map(BatchSlot::from).collect(), category)
            .await
    }

    /// Issue all slots concurrently, settle all, persist successes
    ///
    /// `len(artifacts) <= len(slots)` and artifacts keep submission order.
    ///
    /// # Errors
    /// - `StudioError::InputInvalid` for an empty batch
    /// - `StudioError::BatchRejected` if the client cannot issue calls
    /// - `StudioError::Aborted` if the batch task did not settle
    pub async fn run_slots(
        &self,
        slots: Vec<BatchSlot>,
        category: Category,
    ) -> Result<BatchOutcome, StudioError> {
        if slots.is_empty() {
            return Err(StudioError::input("batch has no requests"));
        }
        self.ensure_ready()?;

        let batch_id = Ulid::new();
        let requested = slots.len();
        let span = tracing::info_span!("batch", %batch_id, %category, size = requested);

        let client = Arc::clone(&self.client);
        let store = self.store.clone();
        let clock = Arc::clone(&self.clock);

        let task = async move {
            tracing::info!("batch started");
            let settled = join_all(
                slots
                    .into_iter()
                    .enumerate()
                    .map(|(index, slot)| run_slot(Arc::clone(&client), index, slot)),
            )
            .await;

            let mut artifacts = Vec::with_capacity(requested);
            let mut failures = Vec::new();
            for (index, meta, result) in settled {
                match result.and_then(|success| {
                    build_artifact(category, &clock, meta.clone(), success)
                }) {
                    Ok(artifact) => artifacts.push(artifact),
                    Err(failure) => {
                        tracing::warn!(slot = index, reason = failure.reason(), %failure, "generation call produced no artifact");
                        failures.push(SlotFailure {
                            index,
                            slide: meta.slide,
                            failure,
                        });
                    }
                }
            }

            let write = store.put_many(artifacts.clone()).await;
            let state = if failures.is_empty() {
                BatchState::Complete
            } else {
                BatchState::PartialComplete
            };
            tracing::info!(
                succeeded = artifacts.len(),
                failed = failures.len(),
                persisted = write.persisted,
                "batch settled"
            );

            BatchOutcome {
                batch_id,
                category,
                requested,
                artifacts,
                failures,
                state,
                persisted: write.persisted,
                evicted: write.evicted,
            }
        }
        .instrument(span);

        tokio::spawn(task)
            .await
            .map_err(|e| StudioError::Aborted(e.to_string()))
    }
}

/// Provenance carried from a slot to its artifact
#[derive(Debug, Clone)]
struct SlotMeta {
    prompt_summary: String,
    scenario_label: String,
    slide: Option<SlideTag>,
    references: Vec<aura_artifact::ImageDigest>,
}

async fn run_slot(
    client: Arc<dyn GenerationClient>,
    index: usize,
    slot: BatchSlot,
) -> (usize, SlotMeta, Result<SlotSuccess, CallFailure>) {
    let BatchSlot {
        request,
        prompt_summary,
        scenario_label,
        slide,
        enrichment,
        mapper,
    } = slot;
    let meta = SlotMeta {
        prompt_summary,
        scenario_label,
        slide,
        references: request.reference_digests(),
    };

    tracing::debug!(slot = index, "call issued");
    let call = async move {
        let main = client.invoke(&request);
        match enrichment {
            Some(Enrichment {
                request: side_request,
                render,
            }) => {
                let (main, side) = futures::join!(main, client.invoke(&side_request));
                let side_text = side.as_ref().ok().and_then(GeneratedPayload::as_text);
                if let Err(failure) = &side {
                    tracing::debug!(slot = index, %failure, "enrichment call failed, using fallback");
                }
                let narrative = render(side_text);
                main.and_then(mapper).map(|payload| SlotSuccess {
                    payload,
                    narrative: Some(narrative),
                })
            }
            None => main.await.and_then(mapper).map(|payload| SlotSuccess {
                payload,
                narrative: None,
            }),
        }
    };
    // a panic stays inside this slot; siblings and the batch write go on
    let result = AssertUnwindSafe(call)
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(CallFailure::Panicked(panic_message(panic.as_ref()))));
    (index, meta, result)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn build_artifact(
    category: Category,
    clock: &LogicalClock,
    meta: SlotMeta,
    success: SlotSuccess,
) -> Result<Artifact, CallFailure> {
    let mut artifact = Artifact::new(category, success.payload, clock.tick())
        .map_err(|e| CallFailure::Malformed(e.to_string()))?
        .with_prompt_summary(meta.prompt_summary)
        .with_scenario_label(meta.scenario_label)
        .with_references(meta.references);
    if let Some(slide) = meta.slide {
        artifact = artifact.with_slide(slide);
    }
    if let Some(narrative) = success.narrative {
        artifact.attach_video_narrative(narrative);
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_prompt::AspectRatio;
    use aura_test_utils::{fixtures, ScriptedClient};

    fn orchestrator(client: ScriptedClient) -> (Orchestrator, Arc<ScriptedClient>) {
        let client = Arc::new(client);
        let orch = Orchestrator::new(
            client.clone(),
            ArtifactStore::in_memory(25),
            Arc::new(LogicalClock::manual(0)),
        );
        (orch, client)
    }

    fn request(tag: &str) -> GenerationRequest {
        GenerationRequest::image(format!("slot {tag}"), vec![fixtures::reference(1)], AspectRatio::Square)
    }

    #[tokio::test]
    async fn empty_batch_is_input_error() {
        let (orch, client) = orchestrator(ScriptedClient::succeeding());
        let result = orch.run_batch(Vec::new(), Category::Avatar).await;
        assert!(matches!(result, Err(StudioError::InputInvalid(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn not_ready_rejects_without_calls() {
        let (orch, client) = orchestrator(ScriptedClient::not_ready());
        let result = orch.run_batch(vec![request("a")], Category::Avatar).await;
        assert!(matches!(result, Err(StudioError::BatchRejected(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn created_at_follows_slot_order() {
        let (orch, _) = orchestrator(ScriptedClient::succeeding());
        let outcome = orch
            .run_batch(vec![request("a"), request("b"), request("c")], Category::Avatar)
            .await
            .unwrap();
        let stamps: Vec<u64> = outcome.artifacts.iter().map(|a| a.created_at().value()).collect();
        assert_eq!(stamps, vec![1, 2, 3]);
        assert_eq!(outcome.state, BatchState::Complete);
        assert_eq!(orch.store().len().await, 3);
    }

    #[tokio::test]
    async fn text_payload_for_image_slot_is_slot_failure() {
        let (orch, _) = orchestrator(ScriptedClient::succeeding());
        let outcome = orch
            .run_batch(vec![GenerationRequest::text("hi")], Category::Avatar)
            .await
            .unwrap();
        assert!(outcome.artifacts.is_empty());
        assert!(outcome.needs_retry());
        assert!(matches!(outcome.failures[0].failure, CallFailure::Malformed(_)));
    }

    #[test]
    fn panic_message_from_payload() {
        assert_eq!(panic_message(&"client bug"), "client bug");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[tokio::test]
    async fn enrichment_fallback_on_failure() {
        let (orch, client) = orchestrator(
            ScriptedClient::succeeding().fail_text_calls(CallFailure::Quota),
        );
        let slot = BatchSlot::new(request("a")).with_enrichment(Enrichment {
            request: GenerationRequest::text("narrate"),
            render: |text| text.unwrap_or("fallback").to_string(),
        });
        let outcome = orch.run_slots(vec![slot], Category::Avatar).await.unwrap();
        assert_eq!(outcome.artifacts[0].derived_video_narrative(), Some("fallback"));
        assert_eq!(client.call_count(), 2);
    }
}
