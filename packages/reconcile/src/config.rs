//! Engine configuration.
//!
//! [`EngineConfig`] is built once, validated, and handed to the
//! [`Reconciler`](crate::Reconciler). Defaults are embedded at compile time
//! from `config/default.toml`; a user-supplied TOML file may override any
//! subset of them.

use std::path::Path;

use livability_crime_models::{CrimeField, CrimeSubset, CrimeVector, NationalBaseline};
use serde::Deserialize;
use strum_macros::{AsRefStr, Display, EnumString};

const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

/// Errors raised while loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config text is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A baseline rate is zero, negative, or not finite.
    #[error("Invalid national baseline for {field}: {value}")]
    InvalidBaseline {
        /// Offending field.
        field: CrimeField,
        /// Offending rate.
        value: f64,
    },

    /// The neighbor radius is not a finite positive distance.
    #[error("Invalid neighbor radius: {0} km")]
    InvalidRadius(f64),

    /// The wealth threshold is outside `(0, 1]`.
    #[error("Invalid wealth threshold: {0} (expected a value in (0, 1])")]
    InvalidWealthThreshold(f64),
}

/// Ratio used for a subset whose fields are all missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmptySubsetPolicy {
    /// Keep the ratio model's raw result of `0.0`, estimating zero crime.
    Zero,
    /// Substitute `1.0`, estimating the national average.
    NationalAverage,
}

impl EmptySubsetPolicy {
    /// Returns the ratio to use for `subset` given the model's computed
    /// ratio. Only an all-missing subset is affected.
    #[must_use]
    pub fn resolve(self, vector: &CrimeVector, subset: CrimeSubset, computed: f64) -> f64 {
        if !vector.is_subset_empty(subset) {
            return computed;
        }
        match self {
            Self::Zero => computed,
            Self::NationalAverage => 1.0,
        }
    }
}

/// Immutable parameters of a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// National average rate per crime field.
    pub baseline: NationalBaseline,
    /// Donors must be strictly closer than this, in kilometres.
    pub neighbor_radius_km: f64,
    /// Donor income must exceed `recipient income * wealth_threshold`.
    pub wealth_threshold: f64,
    /// Handling of all-missing subsets in the ratio fallback.
    pub empty_subset_policy: EmptySubsetPolicy,
}

/// On-disk shape of a config file; every key is optional so a file can
/// override only what it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineConfigFile {
    baseline: Option<NationalBaseline>,
    neighbor_radius_km: Option<f64>,
    wealth_threshold: Option<f64>,
    empty_subset_policy: Option<EmptySubsetPolicy>,
}

impl EngineConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded `default.toml` is malformed (this is a
    /// compile-time guarantee since the file is embedded and tested).
    #[must_use]
    pub fn embedded() -> Self {
        let file: EngineConfigFile = toml::de::from_str(DEFAULT_CONFIG_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded default.toml: {e}"));

        let (Some(baseline), Some(neighbor_radius_km), Some(wealth_threshold), Some(policy)) = (
            file.baseline,
            file.neighbor_radius_km,
            file.wealth_threshold,
            file.empty_subset_policy,
        ) else {
            panic!("Embedded default.toml is missing a required key");
        };

        Self {
            baseline,
            neighbor_radius_km,
            wealth_threshold,
            empty_subset_policy: policy,
        }
    }

    /// Builds a config with the embedded defaults and a substitute baseline.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseline`] if any rate is not a finite
    /// positive number.
    pub fn with_baseline(baseline: NationalBaseline) -> Result<Self, ConfigError> {
        let config = Self {
            baseline,
            ..Self::embedded()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses TOML text, overlaying it on the embedded defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid TOML for this schema
    /// or the resulting config fails validation.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let file: EngineConfigFile = toml::de::from_str(toml_str)?;
        let defaults = Self::embedded();

        let config = Self {
            baseline: file.baseline.unwrap_or(defaults.baseline),
            neighbor_radius_km: file
                .neighbor_radius_km
                .unwrap_or(defaults.neighbor_radius_km),
            wealth_threshold: file.wealth_threshold.unwrap_or(defaults.wealth_threshold),
            empty_subset_policy: file
                .empty_subset_policy
                .unwrap_or(defaults.empty_subset_policy),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((field, value)) = self.baseline.first_invalid() {
            return Err(ConfigError::InvalidBaseline { field, value });
        }
        if !self.neighbor_radius_km.is_finite() || self.neighbor_radius_km <= 0.0 {
            return Err(ConfigError::InvalidRadius(self.neighbor_radius_km));
        }
        if !(self.wealth_threshold > 0.0 && self.wealth_threshold <= 1.0) {
            return Err(ConfigError::InvalidWealthThreshold(self.wealth_threshold));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
