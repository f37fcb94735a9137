//! DDL statement validation.

pub mod validator;

pub use validator::{SchemaOperationValidator, StatementOutcome};
