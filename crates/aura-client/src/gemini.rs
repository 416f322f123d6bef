//! Gemini REST adapter
//!
//! Speaks the `models/{model}:generateContent` endpoint. Request body
//! construction and response parsing are pure functions so they can be
//! tested without a network.

use std::sync::Arc;
use std::time::Duration;

use aura_artifact::GroundingLink;
use aura_prompt::{GenerationRequest, RequestMode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::Semaphore;

use crate::client::{GeneratedPayload, GenerationClient};
use crate::error::{CallFailure, ClientError};

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Finish reasons that mean the output was withheld by a safety filter
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "IMAGE_SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
];

/// Gemini connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    /// Model used for image-mode requests
    pub image_model: String,
    /// Model used for text-mode requests
    pub text_model: String,
    pub timeout_secs: u64,
    /// Upper bound on concurrent calls through one client; `None` = unbounded
    pub max_in_flight: Option<usize>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            text_model: "gemini-3-flash-preview".to_string(),
            timeout_secs: 120,
            max_in_flight: None,
            api_key: None,
        }
    }
}

impl GeminiConfig {
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = Some(limit);
        self
    }

    /// Key if present and non-blank
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Full endpoint for a model
    #[must_use]
    pub fn endpoint(&self, model: &str) -> String {
        let model = model.trim();
        let path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{path}:generateContent", self.base_url.trim_end_matches('/'))
    }
}

/// [`GenerationClient`] backed by the Gemini REST API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
    permits: Option<Arc<Semaphore>>,
}

impl GeminiClient {
    /// Create new client
    ///
    /// A missing API key is not an error here; it is reported by
    /// [`GenerationClient::ensure_ready`] before any batch is issued.
    ///
    /// # Errors
    /// - `ClientError::InvalidConfig` for a zero timeout or zero in-flight limit
    /// - `ClientError::Http` if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self, ClientError> {
        if config.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig("timeout_secs must be > 0".into()));
        }
        if config.max_in_flight == Some(0) {
            return Err(ClientError::InvalidConfig("max_in_flight must be > 0".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let permits = config.max_in_flight.map(|n| Arc::new(Semaphore::new(n)));

        Ok(Self {
            config,
            http,
            permits,
        })
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_for(&self, mode: RequestMode) -> &str {
        match mode {
            RequestMode::Image => &self.config.image_model,
            RequestMode::Text => &self.config.text_model,
        }
    }

    async fn post(&self, endpoint: &str, key: &str, body: &Value) -> Result<Value, CallFailure> {
        let response = self
            .http
            .post(endpoint)
            .header("x-goog-api-key", key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_failure(&e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_failure(status.as_u16(), &text));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| CallFailure::Malformed(e.to_string()))
    }

    fn transport_failure(&self, e: &reqwest::Error) -> CallFailure {
        if e.is_timeout() {
            CallFailure::Timeout {
                secs: self.config.timeout_secs,
            }
        } else {
            CallFailure::Transport(e.to_string())
        }
    }
}

#[async_trait::async_trait]
impl GenerationClient for GeminiClient {
    fn ensure_ready(&self) -> Result<(), ClientError> {
        self.config
            .api_key()
            .map(|_| ())
            .ok_or(ClientError::MissingCredential)
    }

    async fn invoke(&self, request: &GenerationRequest) -> Result<GeneratedPayload, CallFailure> {
        let key = self
            .config
            .api_key()
            .ok_or_else(|| CallFailure::Unauthorized("no api key configured".into()))?;

        let _permit = match &self.permits {
            Some(sem) => Some(
                Arc::clone(sem)
                    .acquire_owned()
                    .await
                    .map_err(|e| CallFailure::Transport(e.to_string()))?,
            ),
            None => None,
        };

        let model = self.model_for(request.mode());
        let endpoint = self.config.endpoint(model);
        tracing::debug!(
            model,
            mode = ?request.mode(),
            references = request.reference_images().len(),
            "issuing generation call"
        );

        let body = build_body(request);
        let response = self.post(&endpoint, key, &body).await?;
        parse_response(request, &response)
    }
}

/// Map a non-success HTTP status to a failure
fn status_failure(status: u16, body: &str) -> CallFailure {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.chars().take(200).collect());

    match status {
        429 => CallFailure::Quota,
        401 | 403 => CallFailure::Unauthorized(message),
        _ => CallFailure::Service { status, message },
    }
}

/// Build the JSON body for a request
#[must_use]
pub fn build_body(request: &GenerationRequest) -> Value {
    let mut parts = vec![json!({ "text": request.prompt_text() })];
    parts.extend(request.reference_images().iter().map(|img| {
        json!({
            "inlineData": {
                "mimeType": img.mime_type(),
                "data": img.to_base64(),
            }
        })
    }));

    let mut body = Map::new();
    body.insert(
        "contents".to_string(),
        json!([{ "role": "user", "parts": parts }]),
    );

    if let Some(instruction) = request.system_instruction() {
        body.insert(
            "systemInstruction".to_string(),
            json!({ "parts": [{ "text": instruction }] }),
        );
    }

    let mut generation_config = Map::new();
    match request.mode() {
        RequestMode::Image => {
            generation_config.insert("responseModalities".to_string(), json!(["IMAGE"]));
            if let Some(aspect) = request.aspect_ratio() {
                generation_config.insert(
                    "imageConfig".to_string(),
                    json!({ "aspectRatio": aspect.as_str() }),
                );
            }
        }
        RequestMode::Text => {
            if let Some(schema) = request.response_schema() {
                generation_config
                    .insert("responseMimeType".to_string(), json!("application/json"));
                generation_config.insert("responseSchema".to_string(), schema.clone());
            }
        }
    }
    if !generation_config.is_empty() {
        body.insert("generationConfig".to_string(), Value::Object(generation_config));
    }

    if request.search_grounding() {
        body.insert("tools".to_string(), json!([{ "googleSearch": {} }]));
    }

    Value::Object(body)
}

/// Extract the payload from a `generateContent` response
///
/// # Errors
/// - `CallFailure::ContentPolicy` when the prompt or candidate was blocked
/// - `CallFailure::EmptyResult` when no usable part was returned
/// - `CallFailure::Malformed` when inline data is not valid base64
pub fn parse_response(
    request: &GenerationRequest,
    response: &Value,
) -> Result<GeneratedPayload, CallFailure> {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Err(CallFailure::ContentPolicy(reason.to_string()));
    }

    let candidate = response.pointer("/candidates/0");
    let finish_reason = candidate
        .and_then(|c| c.get("finishReason"))
        .and_then(Value::as_str);
    let parts = candidate
        .and_then(|c| c.pointer("/content/parts"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let payload = match request.mode() {
        RequestMode::Image => image_from_parts(parts)?,
        RequestMode::Text => text_from_parts(request, parts, candidate),
    };

    match (payload, finish_reason) {
        (Some(payload), _) => Ok(payload),
        (None, Some(reason)) if BLOCKING_FINISH_REASONS.contains(&reason) => {
            Err(CallFailure::ContentPolicy(reason.to_string()))
        }
        (None, _) => Err(CallFailure::EmptyResult),
    }
}

fn image_from_parts(parts: &[Value]) -> Result<Option<GeneratedPayload>, CallFailure> {
    let inline = parts
        .iter()
        .filter_map(|p| p.get("inlineData").or_else(|| p.get("inline_data")))
        .find(|inline| {
            inline
                .get("data")
                .and_then(Value::as_str)
                .is_some_and(|d| !d.is_empty())
        });

    let Some(inline) = inline else {
        return Ok(None);
    };

    let data = inline.get("data").and_then(Value::as_str).unwrap_or_default();
    let bytes = BASE64
        .decode(data.as_bytes())
        .map_err(|e| CallFailure::Malformed(format!("inline image data: {e}")))?;
    let mime_type = inline
        .get("mimeType")
        .or_else(|| inline.get("mime_type"))
        .and_then(Value::as_str)
        .unwrap_or("image/png")
        .to_string();

    Ok(Some(GeneratedPayload::Image { bytes, mime_type }))
}

fn text_from_parts(
    request: &GenerationRequest,
    parts: &[Value],
    candidate: Option<&Value>,
) -> Option<GeneratedPayload> {
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    if text.trim().is_empty() {
        return None;
    }

    let structured = request
        .response_schema()
        .and_then(|_| serde_json::from_str::<Value>(text.trim()).ok())
        .filter(Value::is_object);
    let grounding = candidate.map(grounding_links).unwrap_or_default();

    Some(GeneratedPayload::Text {
        text,
        structured,
        grounding,
    })
}

fn grounding_links(candidate: &Value) -> Vec<GroundingLink> {
    candidate
        .pointer("/groundingMetadata/groundingChunks")
        .and_then(Value::as_array)
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| chunk.get("web").or_else(|| chunk.get("maps")))
                .filter_map(|source| {
                    let uri = source.get("uri").and_then(Value::as_str)?;
                    (!uri.is_empty()).then(|| GroundingLink {
                        uri: uri.to_string(),
                        title: source
                            .get("title")
                            .and_then(Value::as_str)
                            .unwrap_or_default()
                            .to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_artifact::ReferenceImage;
    use aura_prompt::AspectRatio;
    use pretty_assertions::assert_eq;

    fn image_request() -> GenerationRequest {
        let reference = ReferenceImage::new(vec![1, 2, 3], "image/jpeg").unwrap();
        GenerationRequest::image("make it golden hour", vec![reference], AspectRatio::Portrait3x4)
    }

    #[test]
    fn endpoint_normalizes_model_path() {
        let config = GeminiConfig::default().with_base_url("http://localhost:9/v1beta/");
        assert_eq!(
            config.endpoint("gemini-2.5-flash-image"),
            "http://localhost:9/v1beta/models/gemini-2.5-flash-image:generateContent"
        );
        assert_eq!(
            config.endpoint("models/x"),
            "http://localhost:9/v1beta/models/x:generateContent"
        );
    }

    #[test]
    fn image_body_shape() {
        let body = build_body(&image_request());
        assert_eq!(body["contents"][0]["parts"][0]["text"], "make it golden hour");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "AQID");
        assert_eq!(body["generationConfig"]["imageConfig"]["aspectRatio"], "3:4");
        assert!(body["systemInstruction"]["parts"][0]["text"].is_string());
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn text_body_carries_schema_and_tools() {
        let request = GenerationRequest::text("write")
            .with_response_schema(json!({"type": "object"}))
            .with_search_grounding(true);
        let body = build_body(&request);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "object");
        assert_eq!(body["tools"][0]["googleSearch"], json!({}));
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn parses_inline_image() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "AQID" } }
                ]},
                "finishReason": "STOP"
            }]
        });
        let payload = parse_response(&image_request(), &response).unwrap();
        assert_eq!(
            payload,
            GeneratedPayload::Image {
                bytes: vec![1, 2, 3],
                mime_type: "image/png".into()
            }
        );
    }

    #[test]
    fn blocked_prompt_is_content_policy() {
        let response = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(
            parse_response(&image_request(), &response),
            Err(CallFailure::ContentPolicy("SAFETY".into()))
        );

        let response = json!({ "candidates": [{ "finishReason": "IMAGE_SAFETY" }] });
        assert_eq!(
            parse_response(&image_request(), &response),
            Err(CallFailure::ContentPolicy("IMAGE_SAFETY".into()))
        );
    }

    #[test]
    fn text_only_answer_to_image_request_is_empty() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "I can't" }] }, "finishReason": "STOP" }]
        });
        assert_eq!(
            parse_response(&image_request(), &response),
            Err(CallFailure::EmptyResult)
        );
    }

    #[test]
    fn bad_base64_is_malformed() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "inlineData": { "data": "***" } }] } }]
        });
        assert!(matches!(
            parse_response(&image_request(), &response),
            Err(CallFailure::Malformed(_))
        ));
    }

    #[test]
    fn parses_text_with_grounding() {
        let request = GenerationRequest::text("copy").with_response_schema(json!({"type": "object"}));
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"emailContent\":" }, { "text": "\"hi\"}" }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://a.example", "title": "A" } },
                    { "maps": { "uri": "https://b.example" } },
                    { "web": { "uri": "" } }
                ]}
            }]
        });
        let GeneratedPayload::Text { text, structured, grounding } =
            parse_response(&request, &response).unwrap()
        else {
            panic!("expected text payload");
        };
        assert_eq!(text, "{\"emailContent\":\"hi\"}");
        assert_eq!(structured.unwrap()["emailContent"], "hi");
        assert_eq!(grounding.len(), 2);
        assert_eq!(grounding[1].title, "");
    }

    #[test]
    fn status_mapping() {
        assert_eq!(status_failure(429, ""), CallFailure::Quota);
        assert_eq!(
            status_failure(403, r#"{"error":{"message":"API key not valid"}}"#),
            CallFailure::Unauthorized("API key not valid".into())
        );
        assert!(matches!(status_failure(500, "oops"), CallFailure::Service { status: 500, .. }));
    }

    #[test]
    fn readiness_requires_key() {
        let client = GeminiClient::new(GeminiConfig::default()).unwrap();
        assert!(matches!(client.ensure_ready(), Err(ClientError::MissingCredential)));

        let client = GeminiClient::new(GeminiConfig::default().with_api_key("  ")).unwrap();
        assert!(client.ensure_ready().is_err());

        let client = GeminiClient::new(GeminiConfig::default().with_api_key("k")).unwrap();
        assert!(client.ensure_ready().is_ok());
    }

    #[test]
    fn rejects_zero_limits() {
        let mut config = GeminiConfig::default();
        config.timeout_secs = 0;
        assert!(GeminiClient::new(config).is_err());
        assert!(GeminiClient::new(GeminiConfig::default().with_max_in_flight(0)).is_err());
    }

    #[tokio::test]
    async fn invoke_without_key_is_unauthorized() {
        let client = GeminiClient::new(GeminiConfig::default()).unwrap();
        let result = client.invoke(&image_request()).await;
        assert!(matches!(result, Err(CallFailure::Unauthorized(_))));
    }
}
