//! Video narrative enrichment
//!
//! A text-mode call that describes how a still should move. It runs next to
//! the image call of a derived slot; when it fails a fixed sentence is used.

use aura_artifact::{Category, ReferenceImage};
use aura_prompt::GenerationRequest;

use crate::orchestrator::Enrichment;

/// Motion and continuity rules shared by every video prompt
pub const VIDEO_BASE_FORMULA: &str = "You are a professional film director, VFX supervisor, and motion continuity engineer.

Your task is to generate a video from the provided reference image with maximum consistency, physical realism, and motion stability.

The uploaded image is the absolute canonical source of truth for:
- Character identity, facial structure, and body proportions.
- CLOTHING & ACCESSORIES: Texture, fit, and movement physics.
- OBJECTS & PRODUCTS: Logos, text, shape, and label details must remain 100% static and distinct.

STRICT VISUAL CONSTRAINTS:
1. PRODUCT SOLIDITY: Objects (bottles, jars, phones) must be solid rigid bodies. They must NOT morph, melt, breathe, double, or warp. Labels and logos must remain tack-sharp and legible.
2. NO HALLUCINATIONS: Do not generate extra fingers, extra hands, or duplicate phantom objects floating nearby.
3. PHYSICS: Liquids in bottles/cups must move naturally with gravity. Fabric must drape and fold correctly during movement.
4. INTERACTION: If the model holds an object, the hand grip must remain solid and fixed. The object moves *with* the hand, not independently.

MOTION STYLE:
- SPEED: Extreme slow-motion, cinematic, elegant (0.25x to 0.5x speed). Dreamy and high-end luxury feel.
- FLOW: Smooth, organic, fluid movements. Avoid jerky, robotic, or snap-zoom shifts.
- CAMERA: Steady, professional stabilization (gimbal, dolly, or tripod).

Treat this as a high-budget commercial luxury shot where every frame must maintain brand integrity.";

/// Narrative used when the text call yields nothing
pub const NARRATIVE_FALLBACK: &str =
    "Slow, cinematic camera glide with perfectly stable product details and natural subject flow.";

/// Full video prompt: base formula plus the director's narrative
#[must_use]
pub fn video_prompt(narrative: Option<&str>) -> String {
    let narrative = narrative
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(NARRATIVE_FALLBACK);
    format!("{VIDEO_BASE_FORMULA}\n\nDIRECTOR'S NARRATIVE:\n{narrative}")
}

/// Text request asking for a motion narrative of `reference`
#[must_use]
pub fn narrative_request(
    reference: &ReferenceImage,
    scenario: &str,
    angle: &str,
    category: Category,
) -> GenerationRequest {
    let subject = if category == Category::Product {
        "Commercial Product Bundle"
    } else {
        "High Fashion Model"
    };
    let prompt = format!(
        "You are a Cinematographer and VFX Director for a high-end luxury beauty commercial.
TASK: Write a precise \"Director's Narrative\" text prompt for a video generation model.

INPUT CONTEXT:
- Subject Type: {subject}
- Scene/Setting: {scenario}
- Camera Angle: {angle}

VISUAL ANALYSIS TASK:
Study the reference image. If there is a model, note what she is doing. If there are products, note how they are arranged.

WRITE THE NARRATIVE:
- Movement is SLOW, deliberate and expensive-looking.
- Describe natural flow and any hand-product interaction; labels stay legible throughout.
- Use terms like \"Fluid motion\", \"Cinematic glide\", \"Steady frame\".

OUTPUT: A single descriptive paragraph. No markdown. Products keep 1:1 shape consistency."
    );
    GenerationRequest::text(prompt).with_references(vec![reference.clone()])
}

/// Enrichment attaching a video prompt to a derived slot
#[must_use]
pub fn enrichment(
    reference: &ReferenceImage,
    scenario: &str,
    angle: &str,
    category: Category,
) -> Enrichment {
    Enrichment {
        request: narrative_request(reference, scenario, angle, category),
        render: video_prompt,
    }
}
