use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fraction of pixels allowed to mismatch before a comparison fails (0.1%).
pub const DEFAULT_TOLERANCE: f64 = 0.001;

/// Per-pixel colour distance handed to the differ (pixelmatch scale).
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Blend factor of unchanged pixels in the diff image.
pub const DEFAULT_UNCHANGED_ALPHA: f32 = 0.1;

/// Comparison policy. Every field is optional in TOML; missing keys keep
/// the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    /// Maximum mismatched-pixel ratio (0.0-1.0). `score <= tolerance` passes.
    pub tolerance: f64,
    /// Per-pixel colour distance (0.0-1.0) above which a pixel counts as changed.
    pub threshold: f64,
    /// Ignore pixels the differ classifies as anti-aliasing.
    pub detect_anti_aliasing: bool,
    pub unchanged_alpha: f32,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            threshold: DEFAULT_THRESHOLD,
            detect_anti_aliasing: true,
            unchanged_alpha: DEFAULT_UNCHANGED_ALPHA,
        }
    }
}

/// `Ok(v)` when `v` is within `0.0..=1.0`; the error message names the field.
pub fn validate_fraction(name: &str, v: f64) -> Result<f64, String> {
    if !(0.0..=1.0).contains(&v) {
        return Err(format!("{name} must be between 0.0 and 1.0, got {v}"));
    }
    Ok(v)
}

impl ComparisonConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Check the ranges serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        validate_fraction("tolerance", self.tolerance).map_err(Error::InvalidConfig)?;
        validate_fraction("threshold", self.threshold).map_err(Error::InvalidConfig)?;
        validate_fraction("unchanged_alpha", f64::from(self.unchanged_alpha))
            .map_err(Error::InvalidConfig)?;
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Read and validate a TOML config file.
pub fn load(path: impl AsRef<Path>) -> Result<ComparisonConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = ComparisonConfig::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(config)
}
