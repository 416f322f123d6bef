//! Variation batches for the avatar, product, model x product and background studios

use aura_artifact::ReferenceImage;
use aura_prompt::catalog::{CAMERA_ANGLES, EXPRESSIONS, POSES, PRODUCT_ANGLES};
use aura_prompt::{
    compose_with_notes, resolve, AspectRatio, DirectiveLabels, Fallback, FixedConstraints,
    Selection, ShotNote,
};
use rand::Rng;

use crate::error::StudioError;
use crate::orchestrator::BatchSlot;
use crate::session::{SessionInputs, StudioMode};

/// Per-studio knobs for a variation batch
#[derive(Debug, Clone)]
pub struct VariationProfile {
    pub constraints: FixedConstraints,
    pub labels: DirectiveLabels,
    pub fallback: Fallback,
    pub default_summary: &'static str,
    pub default_scenario: &'static str,
}

impl VariationProfile {
    /// Profile for a variation studio, `None` for carousel and copy modes
    #[must_use]
    pub fn for_mode(mode: StudioMode) -> Option<Self> {
        let profile = match mode {
            StudioMode::Model => Self {
                constraints: FixedConstraints::avatar(),
                labels: DirectiveLabels::AVATAR,
                fallback: Fallback::Random,
                default_summary: "Style Variation",
                default_scenario: "Studio Session",
            },
            StudioMode::Product => Self {
                constraints: FixedConstraints::product(),
                labels: DirectiveLabels::PRODUCT,
                fallback: Fallback::Random,
                default_summary: "Commercial Bundle",
                default_scenario: "Product Lab",
            },
            StudioMode::ModelProduct => Self {
                constraints: FixedConstraints::model_product(),
                labels: DirectiveLabels::MODEL_PRODUCT,
                fallback: Fallback::Random,
                default_summary: "Model X Product",
                default_scenario: "Integrated Set",
            },
            StudioMode::Background => Self {
                constraints: FixedConstraints::background(),
                labels: DirectiveLabels::BACKGROUND,
                fallback: Fallback::Nothing,
                default_summary: "Background Plate",
                default_scenario: "Backdrop",
            },
            StudioMode::Carousel | StudioMode::ContextualCarousel | StudioMode::Copy => {
                return None
            }
        };
        Some(profile)
    }
}

/// Shot variation lines for slot `index`
#[must_use]
pub fn shot_notes(mode: StudioMode, index: usize) -> Vec<ShotNote> {
    let pick = |list: &[&'static str]| list[index % list.len()];
    match mode {
        StudioMode::Model => vec![
            ShotNote::new("POSE", pick(POSES)),
            ShotNote::new("ANGLE", pick(CAMERA_ANGLES)),
            ShotNote::new("EXPRESSION", pick(EXPRESSIONS)),
        ],
        StudioMode::Product => vec![
            ShotNote::new("ANGLE", pick(PRODUCT_ANGLES)),
            ShotNote::new(
                "STRICT REALISM",
                "This must look like a real photograph, not a render.",
            ),
        ],
        StudioMode::ModelProduct => vec![
            ShotNote::new("POSE", pick(POSES)),
            ShotNote::new("ANGLE", pick(CAMERA_ANGLES)),
        ],
        StudioMode::Background => vec![ShotNote::new("CAMERA", pick(CAMERA_ANGLES))],
        _ => Vec::new(),
    }
}

/// References a variation studio sends, checked for presence
fn references(mode: StudioMode, inputs: &SessionInputs) -> Result<Vec<ReferenceImage>, StudioError> {
    let subject = || {
        inputs
            .subject
            .clone()
            .ok_or_else(|| StudioError::input("a subject image is required"))
    };
    let products = || {
        if inputs.products.is_empty() {
            Err(StudioError::input("at least one product image is required"))
        } else {
            Ok(inputs.products.clone())
        }
    };
    match mode {
        StudioMode::Model => Ok(vec![subject()?]),
        StudioMode::Product => products(),
        StudioMode::ModelProduct => {
            let mut refs = vec![subject()?];
            refs.extend(products()?);
            Ok(refs)
        }
        _ => Ok(Vec::new()),
    }
}

/// Build one slot per batch position
///
/// The directive is resolved per slot so the random fallback re-rolls for
/// every call.
///
/// # Errors
/// Returns `StudioError::InputInvalid` when required references are missing,
/// when a background batch has no style, scene or text, or for a non-variation mode
pub fn variation_slots<R>(
    mode: StudioMode,
    selection: &Selection,
    inputs: &SessionInputs,
    aspect: AspectRatio,
    batch_size: usize,
    rng: &mut R,
) -> Result<Vec<BatchSlot>, StudioError>
where
    R: Rng + ?Sized,
{
    let profile = VariationProfile::for_mode(mode)
        .ok_or_else(|| StudioError::input(format!("{mode} is not a variation studio")))?;
    if mode == StudioMode::Background && !selection.has_any() {
        return Err(StudioError::input(
            "choose a scenery, a style or describe the background",
        ));
    }
    let refs = references(mode, inputs)?;
    let summary = selection
        .custom()
        .map_or_else(|| profile.default_summary.to_string(), str::to_string);

    let slots = (0..batch_size)
        .map(|index| {
            let directive = resolve(selection, &profile.labels, profile.fallback, rng);
            let scenario = directive
                .scene_label()
                .unwrap_or(profile.default_scenario)
                .to_string();
            let request = compose_with_notes(
                &directive,
                &profile.constraints,
                &shot_notes(mode, index),
                &refs,
                aspect,
            );
            BatchSlot::new(request)
                .with_prompt_summary(summary.clone())
                .with_scenario_label(scenario)
        })
        .collect();
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_test_utils::fixtures;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs_with_subject() -> SessionInputs {
        SessionInputs {
            subject: Some(fixtures::reference(1)),
            ..SessionInputs::default()
        }
    }

    #[test]
    fn avatar_batch_cycles_shot_notes() {
        let mut rng = StdRng::seed_from_u64(7);
        let slots = variation_slots(
            StudioMode::Model,
            &Selection::new().with_scene("amalfi_beach"),
            &inputs_with_subject(),
            AspectRatio::Portrait9x16,
            5,
            &mut rng,
        )
        .unwrap();

        assert_eq!(slots.len(), 5);
        for (index, slot) in slots.iter().enumerate() {
            let text = slot.request().prompt_text();
            assert!(text.contains(&format!("POSE: {}", POSES[index % POSES.len()])));
            assert!(text.contains(&format!("EXPRESSION: {}", EXPRESSIONS[index % EXPRESSIONS.len()])));
            assert_eq!(slot.prompt_summary(), "Style Variation");
            assert_eq!(slot.request().reference_digests(), vec![fixtures::reference(1).digest()]);
        }
    }

    #[test]
    fn scenario_label_from_chosen_scene() {
        let mut rng = StdRng::seed_from_u64(1);
        let selection = Selection::new().with_scene("amalfi_beach").with_custom_text("golden hour");
        let slots = variation_slots(
            StudioMode::Model,
            &selection,
            &inputs_with_subject(),
            AspectRatio::Portrait9x16,
            1,
            &mut rng,
        )
        .unwrap();
        let scene = aura_prompt::catalog::find_scene("amalfi_beach").unwrap();
        assert_eq!(slots[0].scenario_label(), scene.label);
        assert_eq!(slots[0].prompt_summary(), "golden hour");
    }

    #[test]
    fn model_product_orders_subject_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let inputs = SessionInputs {
            subject: Some(fixtures::reference(1)),
            products: vec![fixtures::reference(2), fixtures::reference(3)],
            ..SessionInputs::default()
        };
        let slots = variation_slots(
            StudioMode::ModelProduct,
            &Selection::default(),
            &inputs,
            AspectRatio::Square,
            2,
            &mut rng,
        )
        .unwrap();
        let digests = slots[0].request().reference_digests();
        assert_eq!(digests[0], fixtures::reference(1).digest());
        assert_eq!(digests.len(), 3);
        assert_eq!(slots[0].scenario_label(), "Integrated Set");
    }

    #[test]
    fn missing_references_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = SessionInputs::default();
        for mode in [StudioMode::Model, StudioMode::Product, StudioMode::ModelProduct] {
            let result = variation_slots(mode, &Selection::default(), &empty, AspectRatio::Square, 5, &mut rng);
            assert!(matches!(result, Err(StudioError::InputInvalid(_))), "{mode}");
        }
    }

    #[test]
    fn background_needs_a_choice_and_sends_no_references() {
        let mut rng = StdRng::seed_from_u64(0);
        let inputs = inputs_with_subject();
        let result = variation_slots(
            StudioMode::Background,
            &Selection::default(),
            &inputs,
            AspectRatio::Portrait9x16,
            5,
            &mut rng,
        );
        assert!(matches!(result, Err(StudioError::InputInvalid(_))));

        let slots = variation_slots(
            StudioMode::Background,
            &Selection::new().with_style("old_money"),
            &inputs,
            AspectRatio::Portrait9x16,
            5,
            &mut rng,
        )
        .unwrap();
        assert!(slots.iter().all(|s| s.request().reference_images().is_empty()));
        assert!(slots[0].request().prompt_text().contains("NO HUMANS. NO PRODUCTS. NO TEXT."));
    }

    #[test]
    fn carousel_is_not_a_variation_studio() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = variation_slots(
            StudioMode::Carousel,
            &Selection::default(),
            &inputs_with_subject(),
            AspectRatio::Square,
            5,
            &mut rng,
        );
        assert!(result.is_err());
    }
}
