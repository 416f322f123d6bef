//! Composite pipeline: subject plus objects in one shot, zero or one output

use std::collections::HashSet;

use aura_artifact::ReferenceImage;
use aura_prompt::{AspectRatio, GenerationRequest};

use crate::error::StudioError;
use crate::orchestrator::BatchSlot;

/// Interaction used when the caller does not describe one
pub const DEFAULT_INTERACTION: &str =
    "she is using one item while the others are placed elegantly nearby";

/// Single slot assigning a role to every reference
///
/// Reference order is subject first, then objects in the given order.
///
/// # Errors
/// Returns `StudioError::InputInvalid` if there are no objects or two
/// references carry the same image
pub fn composite_slot(
    subject: &ReferenceImage,
    objects: &[ReferenceImage],
    interaction: Option<&str>,
    scenario_label: &str,
    aspect: AspectRatio,
) -> Result<BatchSlot, StudioError> {
    if objects.is_empty() {
        return Err(StudioError::input("composite needs at least one product image"));
    }
    let mut seen = HashSet::with_capacity(objects.len() + 1);
    for reference in std::iter::once(subject).chain(objects) {
        if !seen.insert(reference.digest()) {
            return Err(StudioError::input(
                "composite references must be distinct images",
            ));
        }
    }

    let interaction = interaction
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(DEFAULT_INTERACTION);
    let count = objects.len();
    let prompt = format!(
        "COMPOSITE TASK: Model + Product(s) Bundle.\n\
         REFERENCE 1 is the MODEL. References 2 to {last} are the {count} PRODUCT(S) of the collection.\n\
         Create a high-fashion shot of the MODEL interacting with the PRODUCT(S).\n\
         SCENARIO: {scenario_label}.\n\
         INTERACTION: {interaction}.\n\
         STRICT PRODUCT ACCURACY:\n\
         - Every product provided in the reference images must appear exactly as a solid object.\n\
         - Do not morph the labels or logos.\n\
         VIBE: Luxury Ad Campaign. Preserve model's facial identity perfectly.",
        last = count + 1,
    );

    let mut refs = Vec::with_capacity(count + 1);
    refs.push(subject.clone());
    refs.extend_from_slice(objects);

    Ok(BatchSlot::new(GenerationRequest::image(prompt, refs, aspect))
        .with_prompt_summary("Product Kit Mockup")
        .with_scenario_label(format!("{scenario_label} w/ Products")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_test_utils::fixtures;

    #[test]
    fn roles_and_order() {
        let slot = composite_slot(
            &fixtures::reference(1),
            &[fixtures::reference(2)],
            Some("applying the serum"),
            "Amalfi Beach Club",
            AspectRatio::Portrait3x4,
        )
        .unwrap();
        assert_eq!(
            slot.request().reference_digests(),
            vec![fixtures::reference(1).digest(), fixtures::reference(2).digest()]
        );
        let text = slot.request().prompt_text();
        assert!(text.contains("REFERENCE 1 is the MODEL"));
        assert!(text.contains("INTERACTION: applying the serum."));
        assert_eq!(slot.scenario_label(), "Amalfi Beach Club w/ Products");
    }

    #[test]
    fn blank_interaction_uses_default() {
        let slot = composite_slot(
            &fixtures::reference(1),
            &[fixtures::reference(2), fixtures::reference(3)],
            Some("  "),
            "Studio Session",
            AspectRatio::Square,
        )
        .unwrap();
        assert!(slot.request().prompt_text().contains(DEFAULT_INTERACTION));
    }

    #[test]
    fn rejects_missing_or_duplicate_references() {
        let subject = fixtures::reference(1);
        assert!(composite_slot(&subject, &[], None, "x", AspectRatio::Square).is_err());
        assert!(matches!(
            composite_slot(&subject, &[fixtures::reference(1)], None, "x", AspectRatio::Square),
            Err(StudioError::InputInvalid(_))
        ));
    }
}
