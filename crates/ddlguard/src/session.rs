//! Statement execution.

use ddlguard_core::security::Principal;
use ddlguard_core::{CheckedChange, SchemaChange, StatementOutcome};
use ddlguard_lang::Statement;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use crate::database::Database;
use crate::error::{Error, Result};

/// What executing one statement did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Statement kind, e.g. `CREATE TABLE`.
    pub kind: &'static str,
    /// Qualified name of the table, type or keyspace affected.
    pub target: String,
    /// False for `IF NOT EXISTS` on an existing target.
    pub applied: bool,
    /// Guardrail warnings, in declaration order.
    pub warnings: Vec<String>,
}

impl ExecutionResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A client session: a principal and a current keyspace.
///
/// Statements are all-or-nothing: a statement rejected for any reason leaves
/// the schema untouched.
pub struct Session {
    database: Database,
    principal: Principal,
    keyspace: Mutex<Option<String>>,
}

impl Session {
    pub fn new(database: Database, principal: Principal) -> Self {
        Self {
            database,
            principal,
            keyspace: Mutex::new(None),
        }
    }

    /// Set the current keyspace, as `USE` does.
    pub fn with_keyspace(self, keyspace: impl Into<String>) -> Self {
        *self.keyspace.lock() = Some(keyspace.into());
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn keyspace(&self) -> Option<String> {
        self.keyspace.lock().clone()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Execute one statement.
    #[instrument(skip(self), fields(principal = %self.principal))]
    pub fn execute(&self, cql: &str) -> Result<ExecutionResult> {
        let statement = ddlguard_lang::parse(cql)?;
        self.execute_statement(&statement)
    }

    /// Execute a `;`-separated script, stopping at the first error.
    ///
    /// Statements before the failing one stay applied.
    pub fn execute_script(&self, script: &str) -> Result<Vec<ExecutionResult>> {
        ddlguard_lang::parse_script(script)?
            .iter()
            .map(|statement| self.execute_statement(statement))
            .collect()
    }

    /// Execute a parsed statement.
    pub fn execute_statement(&self, statement: &Statement) -> Result<ExecutionResult> {
        let current = self.keyspace();
        let change = match SchemaChange::from_statement(statement, current.as_deref())? {
            Some(change) => change,
            None => return Ok(self.use_keyspace(statement)),
        };
        let target = format!("{}.{}", change.keyspace(), change.target());
        let catalog = self.database.catalog();

        let warnings = match catalog.check(&change)? {
            CheckedChange::NoOp => Vec::new(),
            CheckedChange::Apply(elements) => {
                match self.database.validator().validate(&elements, &self.principal) {
                    StatementOutcome::Accepted => Vec::new(),
                    StatementOutcome::AcceptedWithWarnings(warnings) => warnings,
                    StatementOutcome::Rejected(violation) => return Err(Error::Guardrail(violation)),
                }
            }
        };

        let applied = catalog.apply(change)?;
        debug!(
            kind = statement.kind(),
            target = %target,
            applied,
            warnings = warnings.len(),
            "statement executed"
        );

        Ok(ExecutionResult {
            kind: statement.kind(),
            target,
            applied,
            warnings,
        })
    }

    /// `USE`, the one statement that changes no schema.
    fn use_keyspace(&self, statement: &Statement) -> ExecutionResult {
        if let Statement::Use(use_keyspace) = statement {
            *self.keyspace.lock() = Some(use_keyspace.keyspace.value.clone());
        }
        let keyspace = self.keyspace().unwrap_or_default();
        debug!(keyspace = %keyspace, "keyspace changed");

        ExecutionResult {
            kind: statement.kind(),
            target: keyspace,
            applied: true,
            warnings: Vec::new(),
        }
    }
}
