//! Studio configuration
//!
//! Loaded from TOML, then overlaid with environment variables for the API key.
//!
//! ```toml
//! batch_size = 5
//! store_capacity = 25
//! store_dir = ".aura/history"
//! default_aspect = "9:16"
//! video_narrative = true
//!
//! [gemini]
//! image_model = "gemini-2.5-flash-image"
//! timeout_secs = 120
//! ```

use std::path::{Path, PathBuf};

use aura_client::GeminiConfig;
use aura_prompt::AspectRatio;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variables consulted for the API key, in order
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Studio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Calls per variation batch
    pub batch_size: usize,
    /// Store capacity `K`
    pub store_capacity: usize,
    /// Record directory; `None` keeps history in memory only
    pub store_dir: Option<PathBuf>,
    /// Aspect ratio for new sessions (contextual carousels always start at 3:4)
    pub default_aspect: AspectRatio,
    /// Attach a video narrative to angle-set and Director's Cut outputs
    pub video_narrative: bool,
    /// Seed for directive randomization; `None` seeds from entropy
    pub rng_seed: Option<u64>,
    pub gemini: GeminiConfig,
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed TOML or unknown value types
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid configuration
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Fill the API key from the environment when the file did not set one
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_env_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::with_env_overrides`] with an injectable lookup
    #[must_use]
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if self.gemini.api_key().is_none() {
            self.gemini.api_key = API_KEY_VARS
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty());
        }
        self
    }

    /// With batch size
    #[inline]
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// With store capacity
    #[inline]
    #[must_use]
    pub fn with_store_capacity(mut self, capacity: usize) -> Self {
        self.store_capacity = capacity;
        self
    }

    /// With store directory
    #[inline]
    #[must_use]
    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_default_aspect(mut self, aspect: AspectRatio) -> Self {
        self.default_aspect = aspect;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_video_narrative(mut self, enabled: bool) -> Self {
        self.video_narrative = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_gemini(mut self, gemini: GeminiConfig) -> Self {
        self.gemini = gemini;
        self
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` for a zero batch size, capacity or timeout
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid {
                field: "batch_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.store_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "store_capacity",
                reason: "must be at least 1".into(),
            });
        }
        if self.gemini.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "gemini.timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            store_capacity: aura_store::DEFAULT_CAPACITY,
            store_dir: None,
            default_aspect: AspectRatio::Portrait9x16,
            video_narrative: true,
            rng_seed: None,
            gemini: GeminiConfig::default(),
        }
    }
}
