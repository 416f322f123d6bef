//! Marketing copy
//!
//! One grounded text call asking for structured output. Parsing degrades in
//! three steps: schema fields, `### SECTION n` headers, fixed-width slices.

use aura_artifact::{CopyBundle, Payload};
use aura_client::{CallFailure, GeneratedPayload};
use aura_prompt::GenerationRequest;
use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::StudioError;
use crate::orchestrator::BatchSlot;

pub const COPYWRITER_INSTRUCTION: &str = "Conversion-optimized luxury copywriter.";

/// Width of each fallback slice, in characters
const SLICE_WIDTH: usize = 500;

/// Structured reply requested from the service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CopyResponse {
    /// Email strategy
    pub email_content: String,
    /// Social media scripts
    pub social_content: String,
    /// Sales page
    pub sales_page_content: String,
}

/// JSON schema for [`CopyResponse`] in the shape the service accepts
#[must_use]
pub fn response_schema() -> serde_json::Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(CopyResponse))
        .unwrap_or(serde_json::Value::Null);
    if let Some(object) = schema.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
    }
    schema
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str, StudioError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| StudioError::input(format!("{what} is required")))
}

/// Single copy slot
///
/// # Errors
/// Returns `StudioError::InputInvalid` without a product name or context
pub fn copy_slot(
    product_name: Option<&str>,
    context: Option<&str>,
    audience: Option<&str>,
) -> Result<BatchSlot, StudioError> {
    let product_name = required(product_name, "product name")?.to_string();
    let context = required(context, "product context")?;
    let audience = audience.map(str::trim).filter(|a| !a.is_empty()).unwrap_or("general luxury consumers");

    let prompt = format!(
        "SOCIAL MEDIA SEO & COPYWRITER: Research trends for \"{product_name}\". Context: {context}. Target: {audience}.\n\
         Write three pieces: an email strategy, social media scripts and a sales page.\n\
         If you cannot return structured fields, use these section headers exactly:\n\
         ### SECTION 1\n(Email Strategy content)\n\
         ### SECTION 2\n(Social Media Scripts content)\n\
         ### SECTION 3\n(Sales Page content)\n\
         Tone: Elegant & Persuasive. Focus on conversion and brand loyalty."
    );

    let mut request = GenerationRequest::text(prompt)
        .with_system_instruction(COPYWRITER_INSTRUCTION)
        .with_search_grounding(true);
    let schema = response_schema();
    if !schema.is_null() {
        request = request.with_response_schema(schema);
    }

    Ok(BatchSlot::new(request)
        .with_prompt_summary(format!("Copy: {product_name}"))
        .with_scenario_label("Marketing Copy")
        .with_mapper(move |payload| parse_copy(&product_name, payload)))
}

static SECTION_1: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)### SECTION 1(.*?)### SECTION 2").expect("section 1 regex"));
static SECTION_2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)### SECTION 2(.*?)### SECTION 3").expect("section 2 regex"));
static SECTION_3: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)### SECTION 3(.*)").expect("section 3 regex"));

fn section(pattern: &Regex, text: &str) -> Option<String> {
    let caps = pattern.captures(text)?;
    Some(caps.get(1)?.as_str().trim().to_string())
}

/// Characters `[start, end)` of `text`; `end = None` runs to the end
fn char_slice(text: &str, start: usize, end: Option<usize>) -> String {
    let chars = text.chars().skip(start);
    match end {
        Some(end) => chars.take(end.saturating_sub(start)).collect(),
        None => chars.collect(),
    }
}

/// Split free text into the three copy sections
#[must_use]
pub fn split_sections(text: &str) -> CopyResponse {
    CopyResponse {
        email_content: section(&SECTION_1, text)
            .unwrap_or_else(|| char_slice(text, 0, Some(SLICE_WIDTH))),
        social_content: section(&SECTION_2, text)
            .unwrap_or_else(|| char_slice(text, SLICE_WIDTH, Some(2 * SLICE_WIDTH))),
        sales_page_content: section(&SECTION_3, text)
            .unwrap_or_else(|| char_slice(text, 2 * SLICE_WIDTH, None)),
    }
}

/// Turn a text reply into a copy payload
///
/// # Errors
/// - `CallFailure::EmptyResult` for a blank reply
/// - `CallFailure::Malformed` for an image reply
pub fn parse_copy(product_name: &str, payload: GeneratedPayload) -> Result<Payload, CallFailure> {
    let GeneratedPayload::Text {
        text,
        structured,
        grounding,
    } = payload
    else {
        return Err(CallFailure::Malformed("expected text, got image".into()));
    };

    let parsed = structured
        .and_then(|value| serde_json::from_value::<CopyResponse>(value).ok())
        .or_else(|| serde_json::from_str::<CopyResponse>(text.trim()).ok());
    let response = match parsed {
        Some(response) => response,
        None if text.trim().is_empty() => return Err(CallFailure::EmptyResult),
        None => {
            tracing::debug!("copy reply not structured, splitting sections");
            split_sections(&text)
        }
    };

    Ok(Payload::Copy(CopyBundle {
        product_name: product_name.to_string(),
        email_content: response.email_content,
        social_content: response.social_content,
        sales_page_content: response.sales_page_content,
        grounding_links: grounding
            .into_iter()
            .filter(|link| !link.uri.is_empty())
            .collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_artifact::GroundingLink;
    use pretty_assertions::assert_eq;

    fn text(body: &str) -> GeneratedPayload {
        GeneratedPayload::Text {
            text: body.to_string(),
            structured: None,
            grounding: Vec::new(),
        }
    }

    #[test]
    fn schema_is_plain_object() {
        let schema = response_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
        assert!(schema["properties"].get("salesPageContent").is_some());
    }

    #[test]
    fn structured_fields_win() {
        let payload = GeneratedPayload::Text {
            text: String::new(),
            structured: Some(serde_json::json!({
                "emailContent": "e",
                "socialContent": "s",
                "salesPageContent": "p"
            })),
            grounding: vec![GroundingLink {
                uri: "https://example.com/trends".into(),
                title: "Trends".into(),
            }],
        };
        let Payload::Copy(bundle) = parse_copy("Rose Serum", payload).unwrap() else {
            panic!("expected copy payload");
        };
        assert_eq!(bundle.email_content, "e");
        assert_eq!(bundle.sales_page_content, "p");
        assert_eq!(bundle.grounding_links.len(), 1);
        assert_eq!(bundle.product_name, "Rose Serum");
    }

    #[test]
    fn section_headers_split() {
        let body = "intro\n### SECTION 1\n Email body \n### SECTION 2\nSocial body\n### SECTION 3\nSales body\n";
        let Payload::Copy(bundle) = parse_copy("x", text(body)).unwrap() else {
            panic!("expected copy payload");
        };
        assert_eq!(bundle.email_content, "Email body");
        assert_eq!(bundle.social_content, "Social body");
        assert_eq!(bundle.sales_page_content, "Sales body");
    }

    #[test]
    fn unstructured_text_sliced() {
        let body: String = "é".repeat(1200);
        let sections = split_sections(&body);
        assert_eq!(sections.email_content.chars().count(), 500);
        assert_eq!(sections.social_content.chars().count(), 500);
        assert_eq!(sections.sales_page_content.chars().count(), 200);
    }

    #[test]
    fn blank_reply_is_empty_result() {
        assert_eq!(parse_copy("x", text("  ")), Err(CallFailure::EmptyResult));
    }

    #[test]
    fn slot_requires_name_and_context() {
        assert!(copy_slot(None, Some("ctx"), None).is_err());
        assert!(copy_slot(Some("Serum"), Some(" "), None).is_err());

        let slot = copy_slot(Some("Serum"), Some("hydrating"), Some("Gen Z")).unwrap();
        let req = slot.request();
        assert!(req.search_grounding());
        assert!(req.response_schema().is_some());
        assert_eq!(req.system_instruction(), Some(COPYWRITER_INSTRUCTION));
        assert!(req.prompt_text().contains("Target: Gen Z"));
    }
}
