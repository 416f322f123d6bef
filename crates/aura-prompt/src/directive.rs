//! Directive resolution
//!
//! Turns a user's partial selection (style id, scene id, free text, color)
//! into one concrete [`Directive`]. Resolution is a pure function of the
//! selection and an injected random source, so seeded tests are deterministic.
//!
//! Precedence:
//! - free text with no preset chosen (or in [`Precedence::Override`] mode)
//!   is the sole directive and suppresses presets
//! - chosen presets are concatenated, free text appended as an extra line
//! - nothing chosen: one style and one scene are drawn at random, per call

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{self, Preset};

/// How free text combines with chosen presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Free text replaces every preset
    Override,
    /// Free text is appended after preset lines
    #[default]
    Additive,
}

/// What to do when nothing at all is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Fallback {
    /// Draw a random style and scene
    #[default]
    Random,
    /// Resolve to an empty directive
    Nothing,
}

/// Raw selection state as supplied by the upstream UI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub style_id: Option<String>,
    pub scene_id: Option<String>,
    pub custom_text: Option<String>,
    /// Hex code of a palette color
    pub color: Option<String>,
    #[serde(default)]
    pub precedence: Precedence,
}

impl Selection {
    /// Create empty selection
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_style(mut self, id: impl Into<String>) -> Self {
        self.style_id = Some(id.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_scene(mut self, id: impl Into<String>) -> Self {
        self.scene_id = Some(id.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_custom_text(mut self, text: impl Into<String>) -> Self {
        self.custom_text = Some(text.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_color(mut self, hex: impl Into<String>) -> Self {
        self.color = Some(hex.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_precedence(mut self, precedence: Precedence) -> Self {
        self.precedence = precedence;
        self
    }

    /// Trimmed free text, `None` when blank
    #[must_use]
    pub fn custom(&self) -> Option<&str> {
        self.custom_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Chosen style preset; unknown ids count as not chosen
    #[must_use]
    pub fn style(&self) -> Option<&'static Preset> {
        self.style_id.as_deref().and_then(catalog::find_style)
    }

    /// Chosen scene preset; unknown ids count as not chosen
    #[must_use]
    pub fn scene(&self) -> Option<&'static Preset> {
        self.scene_id.as_deref().and_then(catalog::find_scene)
    }

    /// Whether the user chose anything that steers content
    #[must_use]
    pub fn has_any(&self) -> bool {
        self.style().is_some() || self.scene().is_some() || self.custom().is_some()
    }
}

/// Line labels a studio uses when rendering preset directives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveLabels {
    pub style: &'static str,
    pub scene: &'static str,
    pub additional: &'static str,
    /// Parenthetical appended after a free-text override
    pub override_note: &'static str,
}

impl DirectiveLabels {
    pub const AVATAR: Self = Self {
        style: "AESTHETIC",
        scene: "SCENERY",
        additional: "ADDITIONAL INSTRUCTIONS",
        override_note: "IGNORE all other style and environment presets. Follow these instructions ONLY. Ensure the model from reference image is the protagonist.",
    };

    pub const PRODUCT: Self = Self {
        style: "THEME",
        scene: "SCENERY",
        additional: "ADDITIONAL REQUEST",
        override_note: "IGNORE style presets. Follow these instructions ONLY while maintaining product integrity.",
    };

    pub const MODEL_PRODUCT: Self = Self {
        style: "STYLE AESTHETIC",
        scene: "LUXURY SCENERY",
        additional: "ADDITIONAL REQUEST",
        override_note: "IGNORE style presets. Follow these instructions ONLY while maintaining the reference model as the hero.",
    };

    pub const BACKGROUND: Self = Self {
        style: "MOOD",
        scene: "SETTING",
        additional: "DETAILS",
        override_note: "IGNORE all presets. Render an empty environment only.",
    };
}

/// Which input drove the resolved directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    PresetStyle,
    PresetScene,
    FreeText,
    None,
}

/// Palette color carried into the composed prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorHint {
    pub name: String,
    pub hex: String,
}

impl ColorHint {
    /// Resolve a hex code against the palette; off-palette codes use the hex as name
    #[must_use]
    pub fn from_hex(hex: &str) -> Self {
        match catalog::find_color(hex) {
            Some(swatch) => Self {
                name: swatch.name.to_string(),
                hex: swatch.hex.to_string(),
            },
            None => Self {
                name: hex.to_string(),
                hex: hex.to_string(),
            },
        }
    }
}

/// A resolved generation instruction. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    kind: DirectiveKind,
    text: String,
    color_hint: Option<ColorHint>,
    scene_label: Option<String>,
    randomized: bool,
}

impl Directive {
    /// Directive carrying no instruction text
    #[must_use]
    pub fn none() -> Self {
        Self {
            kind: DirectiveKind::None,
            text: String::new(),
            color_hint: None,
            scene_label: None,
            randomized: false,
        }
    }

    /// Directive made of literal text, bypassing preset resolution
    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            kind: DirectiveKind::FreeText,
            text: text.into(),
            ..Self::none()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_color_hint(mut self, hint: ColorHint) -> Self {
        self.color_hint = Some(hint);
        self
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> DirectiveKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn color_hint(&self) -> Option<&ColorHint> {
        self.color_hint.as_ref()
    }

    /// Label of the explicitly chosen scene (random draws do not count)
    #[inline]
    #[must_use]
    pub fn scene_label(&self) -> Option<&str> {
        self.scene_label.as_deref()
    }

    /// True when presets were drawn at random
    #[inline]
    #[must_use]
    pub fn is_randomized(&self) -> bool {
        self.randomized
    }
}

/// Resolve a selection into a directive
///
/// Never fails. Invoke once per generation call so the random fallback
/// re-rolls for every slot of a batch.
pub fn resolve<R>(
    selection: &Selection,
    labels: &DirectiveLabels,
    fallback: Fallback,
    rng: &mut R,
) -> Directive
where
    R: Rng + ?Sized,
{
    let style = selection.style();
    let scene = selection.scene();
    let custom = selection.custom();
    let color_hint = selection.color.as_deref().map(ColorHint::from_hex);
    let scene_label = scene.map(|s| s.label.to_string());
    let presets_chosen = style.is_some() || scene.is_some();

    let mut directive = if let Some(text) = custom.filter(|_| {
        !presets_chosen || selection.precedence == Precedence::Override
    }) {
        Directive {
            kind: DirectiveKind::FreeText,
            text: format!(
                "STRICT CUSTOM DIRECTIVE: {text}\n({})",
                labels.override_note
            ),
            color_hint: None,
            // the scene is suppressed along with its prompt text
            scene_label: None,
            randomized: false,
        }
    } else if presets_chosen {
        let mut lines = Vec::with_capacity(3);
        if let Some(style) = style {
            lines.push(format!("{}: {}", labels.style, style.prompt));
        }
        if let Some(scene) = scene {
            lines.push(format!("{}: {}", labels.scene, scene.prompt));
        }
        if let Some(text) = custom {
            lines.push(format!("{}: {text}", labels.additional));
        }
        Directive {
            kind: if style.is_some() {
                DirectiveKind::PresetStyle
            } else {
                DirectiveKind::PresetScene
            },
            text: lines.join("\n"),
            color_hint: None,
            scene_label,
            randomized: false,
        }
    } else if fallback == Fallback::Random {
        let style = &catalog::STYLES[rng.random_range(0..catalog::STYLES.len())];
        let scene = &catalog::SCENES[rng.random_range(0..catalog::SCENES.len())];
        Directive {
            kind: DirectiveKind::PresetStyle,
            text: format!(
                "{}: {}\n{}: {}",
                labels.style, style.prompt, labels.scene, scene.prompt
            ),
            color_hint: None,
            scene_label: None,
            randomized: true,
        }
    } else {
        Directive::none()
    };

    directive.color_hint = color_hint;
    directive
}
