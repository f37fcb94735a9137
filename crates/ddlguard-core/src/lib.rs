//! ddlguard core
//!
//! Guardrails for schema statements. The central check finds every vector
//! type declared by a table column or user type field, at any nesting depth,
//! and compares its dimension count against configurable warn and fail
//! thresholds.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ddlguard_core::ddl::{SchemaOperationValidator, StatementOutcome};
//! use ddlguard_core::guardrails::{ElementLabel, GuardrailRegistry};
//! use ddlguard_core::security::Principal;
//! use ddlguard_core::types::{ScalarType, TypeExpression};
//!
//! let registry = Arc::new(GuardrailRegistry::new());
//! registry.set_vector_dimensions_threshold(2, 4).unwrap();
//! let validator = SchemaOperationValidator::new(registry);
//!
//! let v = TypeExpression::vector(TypeExpression::scalar(ScalarType::Float), 3).unwrap();
//! let outcome = validator.validate(&[(ElementLabel::column("v"), v)], &Principal::user("alice"));
//! assert!(matches!(outcome, StatementOutcome::AcceptedWithWarnings(_)));
//! ```

pub mod catalog;
pub mod ddl;
pub mod error;
pub mod guardrails;
pub mod security;
pub mod types;

pub use catalog::{Catalog, CheckedChange, SchemaChange};
pub use ddl::{SchemaOperationValidator, StatementOutcome};
pub use error::{CatalogError, CatalogResult, StructuralError};
pub use guardrails::{
    ConfigurationError, Decision, ElementLabel, GuardrailEvaluator, GuardrailRegistry,
    GuardrailViolation, GuardrailsConfig, ThresholdPolicy, VectorDimensionWalker,
};
pub use security::{ExclusionPredicate, Principal};
pub use types::{ScalarType, TypeExpression, UserType};
