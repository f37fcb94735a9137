//! Guardrail errors.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid guardrail configuration, rejected before it takes effect.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Negative values other than `-1` (disabled).
    #[error("invalid value {value} for {name}: negative values other than -1 are not allowed")]
    Negative { name: String, value: i64 },

    /// Zero would reject every vector.
    #[error("invalid value 0 for {name}: must be -1 (disabled) or at least 1")]
    Zero { name: String },

    #[error("invalid value {value} for {name}: must not exceed {max}", max = u32::MAX)]
    TooLarge { name: String, value: i64 },

    /// A configuration file could not be read.
    #[error("failed to read guardrail configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse guardrail configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for guardrail configuration.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

/// A statement rejected by a guardrail.
///
/// Displays as the failure message alone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GuardrailViolation {
    /// Name of the guardrail that failed.
    pub guardrail: String,
    pub message: String,
}

impl GuardrailViolation {
    pub fn new(guardrail: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            guardrail: guardrail.into(),
            message: message.into(),
        }
    }
}
