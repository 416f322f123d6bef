//! Derived artifact pipelines
//!
//! Pure builders: each turns session inputs or a prior artifact into the
//! slots of one batch. Running the batch is the orchestrator's job.

pub mod angles;
pub mod carousel;
pub mod composite;
pub mod copy;
pub mod narrative;
pub mod variations;

pub use angles::{angle_list, angle_slots, AngleSetKind, DERIVED_ASPECT};
pub use carousel::{contextual_slides, kit_slides, sequence_slots, ContextualRefs, SlideSpec};
pub use composite::composite_slot;
pub use copy::{copy_slot, parse_copy, CopyResponse};
pub use variations::{variation_slots, VariationProfile};
