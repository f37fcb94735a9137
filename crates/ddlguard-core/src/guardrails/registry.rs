//! Process-wide guardrail thresholds.

use super::config::{vector_dimensions_policy, GuardrailsConfig};
use super::error::ConfigurationResult;
use super::evaluator::GuardrailEvaluator;
use super::threshold::{Threshold, ThresholdPolicy};

/// Holds the live threshold of every guardrail.
///
/// Shared behind an `Arc`. Readers take a snapshot per check, so a
/// concurrent update is seen either entirely or not at all.
#[derive(Debug)]
pub struct GuardrailRegistry {
    vector_dimensions: Threshold,
}

impl Default for GuardrailRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardrailRegistry {
    /// All guardrails disabled.
    pub fn new() -> Self {
        Self::with_vector_dimensions(ThresholdPolicy::DISABLED)
    }

    pub fn with_vector_dimensions(policy: ThresholdPolicy) -> Self {
        Self {
            vector_dimensions: Threshold::new(GuardrailEvaluator::VECTOR_DIMENSIONS, policy),
        }
    }

    pub fn from_config(config: &GuardrailsConfig) -> ConfigurationResult<Self> {
        Ok(Self::with_vector_dimensions(config.vector_dimensions_policy()?))
    }

    pub fn vector_dimensions(&self) -> &Threshold {
        &self.vector_dimensions
    }

    /// Replace the vector dimension thresholds. `-1` disables a ceiling.
    ///
    /// Both values are validated before either takes effect.
    pub fn set_vector_dimensions_threshold(&self, warn: i64, fail: i64) -> ConfigurationResult<()> {
        let policy = vector_dimensions_policy(warn, fail)?;
        self.vector_dimensions.set_policy(policy);
        Ok(())
    }

    pub fn vector_dimensions_warn_threshold(&self) -> Option<u32> {
        self.vector_dimensions.policy().warn_threshold()
    }

    pub fn vector_dimensions_fail_threshold(&self) -> Option<u32> {
        self.vector_dimensions.policy().fail_threshold()
    }
}
