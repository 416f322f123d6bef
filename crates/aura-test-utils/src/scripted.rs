//! Scripted generation client
//!
//! Calls of a batch arrive in nondeterministic order, so outcomes are keyed
//! on request content (prompt text) rather than on arrival position.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aura_artifact::{GroundingLink, ImageDigest};
use aura_client::{CallFailure, ClientError, GeneratedPayload, GenerationClient};
use aura_prompt::{AspectRatio, GenerationRequest, RequestMode};
use parking_lot::Mutex;

type Predicate = Box<dyn Fn(&GenerationRequest) -> bool + Send + Sync>;

struct FailureRule {
    matches: Predicate,
    failure: CallFailure,
}

/// What the client saw for one call
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub prompt: String,
    pub mode: RequestMode,
    pub references: Vec<ImageDigest>,
    pub aspect_ratio: Option<AspectRatio>,
    pub has_schema: bool,
}

/// [`GenerationClient`] with deterministic, content-keyed outcomes
pub struct ScriptedClient {
    rules: Vec<FailureRule>,
    panic_on: Vec<String>,
    text_reply: String,
    grounding: Vec<GroundingLink>,
    delay: Option<Duration>,
    ready: bool,
    calls: Mutex<Vec<CallRecord>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl std::fmt::Debug for ScriptedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedClient")
            .field("rules", &self.rules.len())
            .field("ready", &self.ready)
            .field("calls", &self.calls.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for ScriptedClient {
    fn default() -> Self {
        Self::succeeding()
    }
}

impl ScriptedClient {
    /// Client where every call succeeds
    pub fn succeeding() -> Self {
        Self {
            rules: Vec::new(),
            panic_on: Vec::new(),
            text_reply: "Slow orbit around the subject as light glints off the label.".to_string(),
            grounding: Vec::new(),
            delay: None,
            ready: true,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Client that reports it cannot issue calls
    pub fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::succeeding()
        }
    }

    /// Fail every call whose request matches `predicate`
    pub fn fail_when(
        mut self,
        predicate: impl Fn(&GenerationRequest) -> bool + Send + Sync + 'static,
        failure: CallFailure,
    ) -> Self {
        self.rules.push(FailureRule {
            matches: Box::new(predicate),
            failure,
        });
        self
    }

    /// Fail every call whose prompt contains `needle`
    pub fn fail_when_prompt_contains(self, needle: impl Into<String>, failure: CallFailure) -> Self {
        let needle = needle.into();
        self.fail_when(move |req| req.prompt_text().contains(&needle), failure)
    }

    /// Fail every text-mode call
    pub fn fail_text_calls(self, failure: CallFailure) -> Self {
        self.fail_when(|req| req.mode() == RequestMode::Text, failure)
    }

    /// Fail everything
    pub fn failing(failure: CallFailure) -> Self {
        Self::succeeding().fail_when(|_| true, failure)
    }

    /// Panic inside every call whose prompt contains `needle`
    pub fn panic_when_prompt_contains(mut self, needle: impl Into<String>) -> Self {
        self.panic_on.push(needle.into());
        self
    }

    /// Body returned for text-mode calls
    pub fn with_text_reply(mut self, text: impl Into<String>) -> Self {
        self.text_reply = text.into();
        self
    }

    pub fn with_grounding(mut self, links: Vec<GroundingLink>) -> Self {
        self.grounding = links;
        self
    }

    /// Sleep this long inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Snapshot of recorded calls, in arrival order
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Highest number of calls observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn outcome(&self, request: &GenerationRequest) -> Result<GeneratedPayload, CallFailure> {
        if self.panic_on.iter().any(|n| request.prompt_text().contains(n.as_str())) {
            panic!("scripted client bug");
        }
        if let Some(rule) = self.rules.iter().find(|r| (r.matches)(request)) {
            return Err(rule.failure.clone());
        }
        Ok(match request.mode() {
            RequestMode::Image => GeneratedPayload::Image {
                // distinct bytes per prompt so outputs can be told apart
                bytes: ImageDigest::compute(request.prompt_text().as_bytes())
                    .as_bytes()
                    .to_vec(),
                mime_type: "image/png".to_string(),
            },
            RequestMode::Text => GeneratedPayload::Text {
                text: self.text_reply.clone(),
                structured: request
                    .response_schema()
                    .and_then(|_| serde_json::from_str(&self.text_reply).ok()),
                grounding: self.grounding.clone(),
            },
        })
    }
}

#[async_trait::async_trait]
impl GenerationClient for ScriptedClient {
    fn ensure_ready(&self) -> Result<(), ClientError> {
        if self.ready {
            Ok(())
        } else {
            Err(ClientError::MissingCredential)
        }
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<GeneratedPayload, CallFailure> {
        self.calls.lock().push(CallRecord {
            prompt: request.prompt_text().to_string(),
            mode: request.mode(),
            references: request.reference_digests(),
            aspect_ratio: request.aspect_ratio(),
            has_schema: request.response_schema().is_some(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.outcome(request)
    }
}
