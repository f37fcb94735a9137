//! Error types for the embedded API.

use ddlguard_core::guardrails::{ConfigurationError, GuardrailViolation};
use ddlguard_core::CatalogError;
use ddlguard_lang::ParseError;
use thiserror::Error;

/// Errors from executing statements.
#[derive(Debug, Error)]
pub enum Error {
    /// The statement text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The statement is invalid against the current schema.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A guardrail rejected the statement. Displays as the failure message.
    #[error(transparent)]
    Guardrail(#[from] GuardrailViolation),

    /// Invalid guardrail settings.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl Error {
    /// The guardrail violation, if this is one.
    pub fn as_guardrail(&self) -> Option<&GuardrailViolation> {
        match self {
            Error::Guardrail(violation) => Some(violation),
            _ => None,
        }
    }
}

/// Result type for ddlguard operations.
pub type Result<T> = std::result::Result<T, Error>;
