//! Guardrails on declared schema.
//!
//! A guardrail compares a measured property of a statement against a warn and
//! a fail threshold. The vector dimensions guardrail measures the dimension
//! count of every vector inside a column or field type:
//!
//! - [`walker`] finds the vectors,
//! - [`threshold`] decides warn/fail for a single count,
//! - [`evaluator`] combines the two per schema element,
//! - [`registry`] holds the live thresholds, built from [`config`].

pub mod config;
pub mod error;
pub mod evaluator;
pub mod message;
pub mod registry;
pub mod threshold;
pub mod walker;

pub use config::{GuardrailsConfig, DISABLED_THRESHOLD};
pub use error::{ConfigurationError, ConfigurationResult, GuardrailViolation};
pub use evaluator::{Decision, ElementLabel, GuardrailEvaluator};
pub use message::{format_message, Severity};
pub use registry::GuardrailRegistry;
pub use threshold::{Threshold, ThresholdPolicy, Verdict};
pub use walker::{PathSegment, TypePath, VectorDimensionWalker, VectorOccurrence, VectorOccurrences};
