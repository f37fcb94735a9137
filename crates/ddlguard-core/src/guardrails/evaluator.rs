//! Per-element guardrail evaluation.

use std::fmt;

use tracing::{debug, warn};

use super::message::{format_message, Severity};
use super::threshold::{ThresholdPolicy, Verdict};
use super::walker::VectorDimensionWalker;
use crate::security::{ExclusionPredicate, Principal};
use crate::types::TypeExpression;

/// The schema element whose type is being checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementLabel {
    /// A table column.
    Column(String),
    /// A user-defined type field.
    Field(String),
}

impl ElementLabel {
    pub fn column(name: impl Into<String>) -> Self {
        ElementLabel::Column(name.into())
    }

    pub fn field(name: impl Into<String>) -> Self {
        ElementLabel::Field(name.into())
    }

    /// Bare element name.
    pub fn name(&self) -> &str {
        match self {
            ElementLabel::Column(name) | ElementLabel::Field(name) => name,
        }
    }
}

impl fmt::Display for ElementLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementLabel::Column(name) => write!(f, "Column {}", name),
            ElementLabel::Field(name) => write!(f, "Field {}", name),
        }
    }
}

/// Outcome for one vector occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Warned(String),
    Failed(String),
}

impl Decision {
    pub fn is_failed(&self) -> bool {
        matches!(self, Decision::Failed(_))
    }

    /// The warning or failure message.
    pub fn message(&self) -> Option<&str> {
        match self {
            Decision::Allowed => None,
            Decision::Warned(message) | Decision::Failed(message) => Some(message),
        }
    }
}

/// Applies a threshold policy to every vector in a declared type.
#[derive(Debug, Clone, Copy)]
pub struct GuardrailEvaluator {
    guardrail: &'static str,
}

impl GuardrailEvaluator {
    pub const VECTOR_DIMENSIONS: &'static str = "vector_dimensions";

    pub fn new(guardrail: &'static str) -> Self {
        Self { guardrail }
    }

    /// Evaluator for the vector dimensions guardrail.
    pub fn vector_dimensions() -> Self {
        Self::new(Self::VECTOR_DIMENSIONS)
    }

    pub fn guardrail(&self) -> &'static str {
        self.guardrail
    }

    /// Check every vector inside `ty`.
    ///
    /// Returns one decision per occurrence, in walk order. Exempt principals
    /// get an empty result and the type is not walked.
    pub fn check(
        &self,
        label: &ElementLabel,
        ty: &TypeExpression,
        principal: &Principal,
        policy: &ThresholdPolicy,
        exclusion: &dyn ExclusionPredicate,
    ) -> Vec<Decision> {
        if exclusion.is_exempt(principal) {
            debug!(
                guardrail = self.guardrail,
                element = %label,
                principal = %principal,
                "principal exempt from guardrail"
            );
            return Vec::new();
        }

        VectorDimensionWalker::find(ty)
            .map(|occurrence| {
                let verdict = policy.evaluate(occurrence.dimensions);
                let (severity, threshold) = match verdict {
                    Verdict::Allow => return Decision::Allowed,
                    Verdict::Warn { threshold } => (Severity::Warning, threshold),
                    Verdict::Fail { threshold } => (Severity::Failure, threshold),
                };

                let message =
                    format_message(&label.to_string(), severity, occurrence.dimensions, threshold);

                match severity {
                    Severity::Warning => {
                        warn!(
                            guardrail = self.guardrail,
                            element = %label,
                            path = %occurrence.path,
                            dimensions = occurrence.dimensions,
                            threshold,
                            "guardrail warning threshold exceeded"
                        );
                        Decision::Warned(message)
                    }
                    // The rejection is logged once by whoever acts on it.
                    Severity::Failure => {
                        debug!(
                            guardrail = self.guardrail,
                            element = %label,
                            path = %occurrence.path,
                            dimensions = occurrence.dimensions,
                            threshold,
                            "guardrail failure threshold exceeded"
                        );
                        Decision::Failed(message)
                    }
                }
            })
            .collect()
    }
}
