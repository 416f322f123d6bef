//! Artifact and reference-image fixtures

use aura_artifact::{
    Artifact, Category, CopyBundle, ImagePayload, LogicalTimestamp, Payload, ReferenceImage,
};

/// Image artifact with the given category and `created_at`
pub fn image_artifact(category: Category, created_at: u64) -> Artifact {
    let payload = Payload::Image(ImagePayload::new(
        "image/png",
        created_at.to_le_bytes().to_vec(),
    ));
    Artifact::new(category, payload, LogicalTimestamp(created_at))
        .expect("fixture category must be visual")
        .with_prompt_summary("fixture")
        .with_scenario_label("Fixture Set")
}

/// Copy artifact with the given `created_at`
pub fn copy_artifact(created_at: u64) -> Artifact {
    let bundle = CopyBundle {
        product_name: "Rose Serum".to_string(),
        email_content: "email".to_string(),
        social_content: "social".to_string(),
        sales_page_content: "sales".to_string(),
        grounding_links: Vec::new(),
    };
    Artifact::new(Category::Copy, Payload::Copy(bundle), LogicalTimestamp(created_at))
        .expect("copy payload fits copy category")
}

/// Small PNG-typed reference whose bytes are derived from `seed`
pub fn reference(seed: u8) -> ReferenceImage {
    ReferenceImage::new(vec![0x89, b'P', b'N', b'G', seed, seed, seed], "image/png")
        .expect("fixture reference is valid")
}
