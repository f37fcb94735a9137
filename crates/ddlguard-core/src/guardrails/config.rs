//! Guardrail configuration.
//!
//! Thresholds use the operator-facing encoding: a positive count, or `-1` to
//! disable the ceiling. Values are checked by [`GuardrailsConfig::validate`]
//! before they reach a [`ThresholdPolicy`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{ConfigurationError, ConfigurationResult};
use super::threshold::ThresholdPolicy;

/// Threshold value meaning "disabled".
pub const DISABLED_THRESHOLD: i64 = -1;

pub const VECTOR_DIMENSIONS_WARN_THRESHOLD: &str = "vector_dimensions_warn_threshold";
pub const VECTOR_DIMENSIONS_FAIL_THRESHOLD: &str = "vector_dimensions_fail_threshold";

/// Guardrail settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailsConfig {
    /// Warn when a vector has more dimensions than this.
    pub vector_dimensions_warn_threshold: i64,

    /// Reject statements declaring a vector with more dimensions than this.
    pub vector_dimensions_fail_threshold: i64,

    /// Roles that bypass guardrails, in addition to superusers.
    pub exempt_roles: Vec<String>,
}

impl Default for GuardrailsConfig {
    fn default() -> Self {
        Self {
            vector_dimensions_warn_threshold: DISABLED_THRESHOLD,
            vector_dimensions_fail_threshold: DISABLED_THRESHOLD,
            exempt_roles: Vec::new(),
        }
    }
}

impl GuardrailsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set both vector dimension thresholds.
    pub fn with_vector_dimensions_thresholds(mut self, warn: i64, fail: i64) -> Self {
        self.vector_dimensions_warn_threshold = warn;
        self.vector_dimensions_fail_threshold = fail;
        self
    }

    /// Add a role that bypasses guardrails.
    pub fn with_exempt_role(mut self, role: impl Into<String>) -> Self {
        self.exempt_roles.push(role.into());
        self
    }

    /// Parse a JSON document. Missing keys take their defaults.
    pub fn from_json_str(json: &str) -> ConfigurationResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> ConfigurationResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Check every threshold.
    pub fn validate(&self) -> ConfigurationResult<()> {
        self.vector_dimensions_policy().map(|_| ())
    }

    /// The vector dimension thresholds as a policy.
    pub fn vector_dimensions_policy(&self) -> ConfigurationResult<ThresholdPolicy> {
        vector_dimensions_policy(
            self.vector_dimensions_warn_threshold,
            self.vector_dimensions_fail_threshold,
        )
    }
}

/// Build a vector dimensions policy from operator-facing values.
pub fn vector_dimensions_policy(warn: i64, fail: i64) -> ConfigurationResult<ThresholdPolicy> {
    let warn = parse_threshold(VECTOR_DIMENSIONS_WARN_THRESHOLD, warn)?;
    let fail = parse_threshold(VECTOR_DIMENSIONS_FAIL_THRESHOLD, fail)?;
    Ok(ThresholdPolicy::new(warn, fail))
}

/// `-1` disables; any other value must be in `1..=u32::MAX`.
pub fn parse_threshold(name: &str, value: i64) -> ConfigurationResult<Option<u32>> {
    match value {
        DISABLED_THRESHOLD => Ok(None),
        0 => Err(ConfigurationError::Zero {
            name: name.to_string(),
        }),
        v if v < 0 => Err(ConfigurationError::Negative {
            name: name.to_string(),
            value: v,
        }),
        v => u32::try_from(v)
            .map(Some)
            .map_err(|_| ConfigurationError::TooLarge {
                name: name.to_string(),
                value: v,
            }),
    }
}
