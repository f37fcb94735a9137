//! Statement execution.

use crate::formatter::Formatter;
use ddlguard::lang::Statement;
use ddlguard::Session;
use thiserror::Error;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Parse error, already rendered against its source.
    #[error("{0}")]
    Language(String),

    /// Rejected by the catalog or a guardrail.
    #[error(transparent)]
    Database(#[from] ddlguard::Error),
}

/// Parse a `;`-separated script.
pub fn parse(input: &str) -> Result<Vec<Statement>, ExecuteError> {
    ddlguard::lang::parse_script(input)
        .map_err(|e| ExecuteError::Language(e.format_with_source(input)))
}

/// Execute every statement in `input` and return formatted output.
///
/// Stops at the first failing statement; earlier ones stay applied.
pub fn execute(
    session: &Session,
    input: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let mut output = Vec::new();
    for statement in parse(input)? {
        output.push(execute_statement(session, &statement, formatter)?);
    }
    Ok(output.join("\n"))
}

/// Execute one parsed statement.
pub fn execute_statement(
    session: &Session,
    statement: &Statement,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let result = session.execute_statement(statement)?;
    Ok(formatter.format_execution(&result))
}

/// Get help text for the supported statements.
pub fn get_help_text() -> String {
    r#"Supported Statements
====================

CREATE TABLE [IF NOT EXISTS] [ks.]name (
    col type [PRIMARY KEY] [static], ...
    [, PRIMARY KEY ((pk1, pk2), ck1, ...)]
)
CREATE TYPE [IF NOT EXISTS] [ks.]name (field type, ...)
ALTER TABLE [ks.]name ADD col type [static]
ALTER TABLE [ks.]name ADD (col type, ...)
ALTER TYPE [ks.]name ADD field type
USE ks

TYPES
-----
int, bigint, text, float, double, uuid, ...   Native types
list<T>, set<T>, map<K, V>                    Collections
tuple<T1, T2, ...>                            Tuples
frozen<T>                                     Frozen collections and user types
vector<T, N>                                  Fixed-size vectors of N dimensions
name, ks.name                                 User-defined types

GUARDRAILS
----------
Every vector a column or field declares is checked, at any nesting depth.
More dimensions than the warn threshold produces a warning; more than the
fail threshold rejects the statement. Superusers are not checked.
"#
    .to_string()
}
