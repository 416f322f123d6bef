//! Angle-set regeneration and Director's Cut
//!
//! Both take one prior artifact as the sole reference and issue one request
//! per camera angle. Director's Cut uses a superset of angles and stricter
//! wording. Derived artifacts keep the source category.

use aura_artifact::{Artifact, Category, ReferenceImage};
use aura_prompt::catalog::{FRONT_FACING_ANGLE, PRODUCT_ANGLES, WORKFLOW_ANGLES};
use aura_prompt::{AspectRatio, GenerationRequest};

use crate::error::StudioError;
use crate::orchestrator::BatchSlot;
use crate::pipelines::narrative;

/// Aspect ratio used for every derived shot
pub const DERIVED_ASPECT: AspectRatio = AspectRatio::Portrait3x4;

/// Which reshoot to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleSetKind {
    /// Fixed angle list, preserve everything else
    Standard,
    /// Front-facing shot added for people, zero-deviation wording
    DirectorsCut,
}

/// Angles for a source category, in issue order
#[must_use]
pub fn angle_list(category: Category, kind: AngleSetKind) -> Vec<&'static str> {
    let base = if category == Category::Product {
        PRODUCT_ANGLES
    } else {
        WORKFLOW_ANGLES
    };
    let front_facing = kind == AngleSetKind::DirectorsCut
        && matches!(category, Category::Avatar | Category::ModelProduct);

    let mut angles = Vec::with_capacity(base.len() + 1);
    if front_facing {
        angles.push(FRONT_FACING_ANGLE);
    }
    angles.extend_from_slice(base);
    angles
}

fn angle_prompt(kind: AngleSetKind, category: Category, scenario: &str, angle: &str) -> String {
    let product_only = category == Category::Product;
    match kind {
        AngleSetKind::Standard => {
            let tail = if product_only {
                "STRICT CONSTRAINT: NO HUMANS. NO HANDS."
            } else {
                "PRESERVE SUBJECT IDENTITY STRICTLY."
            };
            format!(
                "REFERENCE: Provided source image. Re-generate this SAME subject/product kit in the SAME scenario: \"{scenario}\".\n\
                 CHANGE: Shot must use CAMERA ANGLE: \"{angle}\".\n\
                 Keep background, lighting and wardrobe unchanged; only the viewpoint moves.\n\
                 STRICT PRODUCT ACCURACY:\n\
                 - Maintain 100% accurate labels, shapes, and branding for ALL products in the kit.\n\
                 - Do not add, remove, or morph any products.\n\
                 {tail}"
            )
        }
        AngleSetKind::DirectorsCut => {
            let mut text = format!(
                "DIRECTOR'S CUT: Generate the EXACT SAME subject/product kit in the SAME environment but from a different angle: {angle}.\n\
                 STRICT CONSISTENCY, ZERO DEVIATION:\n\
                 - For Products: 100% accurate branding, labels, and geometry. No morphing. No doubling.\n\
                 - For Model: PRESERVE IDENTITY/OUTFIT 100%. No changes to makeup or features."
            );
            if product_only {
                text.push_str("\nNO HUMANS. NO HANDS. Keep the exact products in the kit unchanged.");
            }
            text
        }
    }
}

fn source_reference(source: &Artifact) -> Result<ReferenceImage, StudioError> {
    let image = source
        .payload()
        .as_image()
        .ok_or_else(|| StudioError::input("angle sets need an image artifact"))?;
    image
        .to_reference()
        .map_err(|e| StudioError::input(format!("artifact image unusable as reference: {e}")))
}

/// One slot per angle, each referencing `source`
///
/// # Errors
/// Returns `StudioError::InputInvalid` if `source` is not an image artifact
pub fn angle_slots(
    source: &Artifact,
    kind: AngleSetKind,
    with_narrative: bool,
) -> Result<Vec<BatchSlot>, StudioError> {
    let reference = source_reference(source)?;
    let category = source.category();
    let scenario = source.scenario_label();

    let slots = angle_list(category, kind)
        .into_iter()
        .map(|angle| {
            let request = GenerationRequest::image(
                angle_prompt(kind, category, scenario, angle),
                vec![reference.clone()],
                DERIVED_ASPECT,
            );
            let (summary, label, narrative_scene) = match kind {
                AngleSetKind::Standard => (
                    format!("Angle: {angle}"),
                    format!("{scenario} ({angle})"),
                    scenario,
                ),
                AngleSetKind::DirectorsCut => (
                    format!("Director's Cut: {angle}"),
                    format!("Original Shot ({angle})"),
                    "Original Context",
                ),
            };
            let slot = BatchSlot::new(request)
                .with_prompt_summary(summary)
                .with_scenario_label(label);
            if with_narrative {
                slot.with_enrichment(narrative::enrichment(
                    &reference,
                    narrative_scene,
                    angle,
                    category,
                ))
            } else {
                slot
            }
        })
        .collect();
    Ok(slots)
}
