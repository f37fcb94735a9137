//! ddlguard - schema guardrails for CQL-style DDL
//!
//! Embedded API: a [`Database`] holds an in-memory schema and guardrail
//! thresholds, and a [`Session`] executes DDL text against it as a given
//! [`Principal`].
//!
//! # Example
//!
//! ```rust
//! use ddlguard::{Database, Error, Principal};
//!
//! let db = Database::new();
//! db.set_vector_dimensions_threshold(2, 4).unwrap();
//!
//! let session = db.session(Principal::user("alice")).with_keyspace("ks");
//! let result = session
//!     .execute("CREATE TABLE t (k int PRIMARY KEY, v vector<float, 3>)")
//!     .unwrap();
//! assert_eq!(
//!     result.warnings,
//!     vec!["Column v has a vector of 3 dimensions, this exceeds the warning threshold of 2."]
//! );
//!
//! let err = session
//!     .execute("ALTER TABLE t ADD w list<vector<float, 5>>")
//!     .unwrap_err();
//! assert!(matches!(err, Error::Guardrail(_)));
//! ```

mod database;
mod error;
mod session;

pub use database::Database;
pub use error::{Error, Result};
pub use session::{ExecutionResult, Session};

pub use ddlguard_core::guardrails::{GuardrailViolation, GuardrailsConfig};
pub use ddlguard_core::security::Principal;

/// Re-export core types for advanced usage.
pub mod core {
    pub use ddlguard_core::*;
}

/// Re-export the DDL parser.
pub mod lang {
    pub use ddlguard_lang::*;
}
