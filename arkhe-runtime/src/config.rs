//! Runtime configuration, read from a TOML file such as:
//!
//! ```toml
//! [conservation]
//! tolerance = 1e-9
//!
//! [registry]
//! enforce-unique-ids = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::ConfigError;

/// Default absolute tolerance for conservation checks.
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Conservation check settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConservationConfig {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

impl Default for ConservationConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

/// Entity registry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryConfig {
    /// Reject a second entity with an already registered id. When false the
    /// newer entity replaces the older one.
    #[serde(default = "default_enforce_unique_ids")]
    pub enforce_unique_ids: bool,
}

fn default_enforce_unique_ids() -> bool {
    true
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            enforce_unique_ids: default_enforce_unique_ids(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub conservation: ConservationConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl RuntimeConfig {
    /// Parses a TOML document, rejecting malformed input and unusable values.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Loads config from `path` if it exists.
    /// Falls back to defaults with a warning on read or parse errors.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No runtime config found at {:?}, using defaults", path);
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!("Loaded runtime config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load runtime config {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let tolerance = self.conservation.tolerance;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "conservation tolerance must be a finite, non-negative number, got {tolerance}"
            )));
        }
        Ok(())
    }
}
