//! Ordered multi-slide sequences
//!
//! Each slide spec carries its own instruction and reference subset. Slide
//! identity (1-based position, label) goes into every slot so surviving
//! artifacts stay labeled whatever happens to their siblings.

use aura_artifact::{ReferenceImage, SlideTag};
use aura_prompt::catalog::CORE_COLOR;
use aura_prompt::{AspectRatio, ColorHint, GenerationRequest};

use crate::error::StudioError;
use crate::orchestrator::BatchSlot;

/// One slide of a sequence
#[derive(Debug, Clone, PartialEq)]
pub struct SlideSpec {
    pub label: &'static str,
    pub instruction: String,
    pub references: Vec<ReferenceImage>,
}

/// Build one slot per slide, positions numbered from 1
#[must_use]
pub fn sequence_slots(specs: Vec<SlideSpec>, aspect: AspectRatio) -> Vec<BatchSlot> {
    specs
        .into_iter()
        .enumerate()
        .map(|(index, spec)| {
            BatchSlot::new(GenerationRequest::image(
                spec.instruction,
                spec.references,
                aspect,
            ))
            .with_prompt_summary(format!("IG: {}", spec.label))
            .with_scenario_label(spec.label)
            .with_slide(SlideTag::new(index + 1, spec.label))
        })
        .collect()
}

fn theme_line(theme: &ColorHint) -> String {
    format!("Theme Color: {} ({}).", theme.name, theme.hex)
}

/// Theme for a carousel, falling back to the core brand color
#[must_use]
pub fn theme_or_core(hex: Option<&str>) -> ColorHint {
    ColorHint::from_hex(hex.map(str::trim).filter(|h| !h.is_empty()).unwrap_or(CORE_COLOR))
}

const KIT_SLIDES: [(&str, &str, bool, bool); 5] = [
    (
        "Cover Thumbnail",
        "COVER IMAGE: High-impact collage of Model + the entire Product Kit. VIBE: Scroll-stopping. Ensure all product logos are crisp and accurate.",
        true,
        true,
    ),
    (
        "Pure Product Set",
        "COMMERCIAL SHOT: Feature the products as a full cohesive kit. NO HUMANS. Accurate branding. Arranged as a high-end display. 100% brand color accuracy.",
        false,
        true,
    ),
    (
        "Lifestyle Action",
        "LIFESTYLE: Model using or holding the products naturally, interacting with the bundle without obscuring the labels. Soft Life vibe.",
        true,
        true,
    ),
    (
        "Background Texture",
        "BACKGROUND: Abstract luxury texture matching the theme color. No products/people.",
        false,
        false,
    ),
    (
        "Detailed Macro",
        "MACRO: Extreme close-up of the key product label or texture. Light reflects off the surface elegantly.",
        false,
        true,
    ),
];

/// The five-slide kit carousel
///
/// # Errors
/// Returns `StudioError::InputInvalid` without a model image or products
pub fn kit_slides(
    model: Option<&ReferenceImage>,
    products: &[ReferenceImage],
    theme: &ColorHint,
) -> Result<Vec<SlideSpec>, StudioError> {
    let model = model.ok_or_else(|| StudioError::input("a model image is required"))?;
    if products.is_empty() {
        return Err(StudioError::input("at least one product image is required"));
    }

    let theme = theme_line(theme);
    Ok(KIT_SLIDES
        .iter()
        .map(|&(label, prompt, with_model, with_products)| {
            let mut references = Vec::new();
            if with_model {
                references.push(model.clone());
            }
            if with_products {
                references.extend_from_slice(products);
            }
            SlideSpec {
                label,
                instruction: format!("{prompt} {theme}"),
                references,
            }
        })
        .collect())
}

/// References of a contextual carousel
#[derive(Debug, Clone, Copy)]
pub struct ContextualRefs<'a> {
    pub model_with_product: &'a ReferenceImage,
    pub model_only: &'a ReferenceImage,
    pub product_only: &'a ReferenceImage,
}

/// The five-slide educational carousel built around a product story
///
/// # Errors
/// Returns `StudioError::InputInvalid` for blank context text
pub fn contextual_slides(
    context: &str,
    refs: ContextualRefs<'_>,
    theme: Option<&ColorHint>,
) -> Result<Vec<SlideSpec>, StudioError> {
    let context = context.trim();
    if context.is_empty() {
        return Err(StudioError::input("carousel context is required"));
    }
    let theme = theme.map(theme_line).unwrap_or_default();
    let ContextualRefs {
        model_with_product,
        model_only,
        product_only,
    } = refs;

    let slide = |label: &'static str, body: &str, references: Vec<&ReferenceImage>| SlideSpec {
        label,
        instruction: format!("{body}\nSTORY CONTEXT: {context}\n{theme}").trim_end().to_string(),
        references: references.into_iter().cloned().collect(),
    };

    Ok(vec![
        slide(
            "Hook",
            "HOOK SLIDE: The model presenting the product to camera. Scroll-stopping, editorial framing with space for a headline.",
            vec![model_with_product],
        ),
        slide(
            "The Moment",
            "PROBLEM SLIDE: The same model alone in a candid everyday moment that sets up the need described in the story. No product visible.",
            vec![model_only],
        ),
        slide(
            "Meet The Product",
            "PRODUCT SLIDE: Hero shot of the product alone on a styled surface. NO HUMANS. Label and packaging 100% accurate.",
            vec![product_only],
        ),
        slide(
            "How To Use",
            "TUTORIAL SLIDE: Close framing of the model's hands using the product step by step. Product identical to the reference.",
            vec![model_with_product, product_only],
        ),
        slide(
            "The Result",
            "RESULT SLIDE: The model glowing and confident after using the product, the product placed nearby. Soft Life vibe.",
            vec![model_only, product_only],
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use aura_test_utils::fixtures;

    #[test]
    fn kit_reference_subsets() {
        let model = fixtures::reference(1);
        let products = vec![fixtures::reference(2), fixtures::reference(3)];
        let specs = kit_slides(Some(&model), &products, &theme_or_core(None)).unwrap();

        let counts: Vec<usize> = specs.iter().map(|s| s.references.len()).collect();
        assert_eq!(counts, vec![3, 2, 3, 0, 2]);
        assert_eq!(specs[0].references[0], model);
        assert!(specs
            .iter()
            .all(|s| s.instruction.ends_with("Theme Color: Dusty Rose (#D99BA3).")));
    }

    #[test]
    fn kit_requires_model_and_products() {
        let theme = theme_or_core(None);
        assert!(kit_slides(None, &[fixtures::reference(2)], &theme).is_err());
        assert!(kit_slides(Some(&fixtures::reference(1)), &[], &theme).is_err());
    }

    #[test]
    fn slots_number_from_one() {
        let model = fixtures::reference(1);
        let specs = kit_slides(Some(&model), &[fixtures::reference(2)], &theme_or_core(Some("#6E7A63"))).unwrap();
        let slots = sequence_slots(specs, AspectRatio::Portrait3x4);

        let tags: Vec<(usize, &str)> = slots
            .iter()
            .map(|s| {
                let tag = s.slide().unwrap();
                (tag.position, tag.label.as_str())
            })
            .collect();
        assert_eq!(tags[0], (1, "Cover Thumbnail"));
        assert_eq!(tags[4], (5, "Detailed Macro"));
        assert_eq!(slots[1].prompt_summary(), "IG: Pure Product Set");
        assert!(slots[0].request().prompt_text().contains("Sage Green (#6E7A63)"));
    }

    #[test]
    fn contextual_needs_context() {
        let (a, b, c) = (fixtures::reference(1), fixtures::reference(2), fixtures::reference(3));
        let refs = ContextualRefs {
            model_with_product: &a,
            model_only: &b,
            product_only: &c,
        };
        assert!(contextual_slides("  ", refs, None).is_err());

        let specs = contextual_slides("Night serum for dry skin", refs, None).unwrap();
        assert_eq!(specs.len(), 5);
        assert_eq!(specs[2].references, vec![c.clone()]);
        assert!(specs.iter().all(|s| s.instruction.contains("STORY CONTEXT: Night serum for dry skin")));
        assert!(!specs[0].instruction.contains("Theme Color"));
    }
}
