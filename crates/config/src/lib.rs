//! Shared configuration for Trellis
//!
//! This crate provides the single source of truth for the tunables of the
//! geometry core: debug validation of the topology, the threshold used to
//! reject degenerate face normals, and builder allocation hints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default for running the full topology validator after each mutation
pub const DEFAULT_VALIDATE_AFTER_MUTATION: bool = false;

/// Default squared-magnitude threshold for a zero face normal
pub const DEFAULT_DEGENERATE_NORMAL_EPSILON: f32 = 1e-12;

/// Default number of points reserved by a face builder
pub const DEFAULT_FACE_CAPACITY_HINT: usize = 4;

/// Errors raised while loading or checking a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse geometry config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for `{field}`: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Configuration for the geometry core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Run the topology validator after every mutation (debug aid)
    pub validate_after_mutation: bool,
    /// Relative threshold below which a Newell normal counts as zero, scaled
    /// by the longest edge to the fourth power
    pub degenerate_normal_epsilon: f32,
    /// Points reserved by `start_face` when no count is given
    pub face_capacity_hint: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            validate_after_mutation: DEFAULT_VALIDATE_AFTER_MUTATION,
            degenerate_normal_epsilon: DEFAULT_DEGENERATE_NORMAL_EPSILON,
            face_capacity_hint: DEFAULT_FACE_CAPACITY_HINT,
        }
    }
}

impl GeometryConfig {
    /// Config with validation after each mutation turned on
    pub fn validating() -> Self {
        Self {
            validate_after_mutation: true,
            ..Self::default()
        }
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Serialize the config to pretty JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that all values are usable
    pub fn validated(self) -> Result<Self, ConfigError> {
        if !self.degenerate_normal_epsilon.is_finite() || self.degenerate_normal_epsilon < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "degenerate_normal_epsilon",
                reason: format!(
                    "must be a finite, non-negative number (got {})",
                    self.degenerate_normal_epsilon
                ),
            });
        }
        Ok(self)
    }
}
