//! ddlguard DDL language
//!
//! Lexer and parser for the CQL-style schema statements whose declared types
//! are checked by the guardrails in `ddlguard-core`.
//!
//! # Supported statements
//!
//! ```text
//! CREATE TABLE [IF NOT EXISTS] ks.t (k int PRIMARY KEY, v vector<float, 3>)
//! CREATE TABLE t (k int, c int, v list<int> static, PRIMARY KEY ((k), c))
//! CREATE TYPE [IF NOT EXISTS] ks.point (x int, v vector<int, 2>)
//! ALTER TABLE t ADD v map<int, frozen<set<vector<int, 4>>>>
//! ALTER TABLE t ADD (a int, b tuple<int, vector<int, 2>>)
//! ALTER TYPE ks.point ADD w vector<int, 2>
//! USE ks
//! ```
//!
//! # Usage
//!
//! ```rust
//! use ddlguard_lang::{parse, Statement};
//!
//! let stmt = parse("CREATE TABLE t (k int PRIMARY KEY, v vector<int, 3>)").unwrap();
//! assert!(matches!(stmt, Statement::CreateTable(_)));
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod span;

pub use ast::{
    AlterTableAdd, AlterTypeAdd, ColumnDecl, CreateTable, CreateType, FieldDecl, PrimaryKey,
    QualifiedName, Statement, TypeSpec, TypeSpecKind, UseKeyspace,
};
pub use error::ParseError;
pub use parser::MAX_TYPE_DEPTH;
pub use span::{Span, Spanned};

/// Parse a single statement (an optional trailing `;` is accepted).
pub fn parse(source: &str) -> Result<Statement, ParseError> {
    parser::parse(source)
}

/// Parse a `;`-separated script.
///
/// ```rust
/// use ddlguard_lang::parse_script;
///
/// let stmts = parse_script("USE ks; CREATE TYPE p (c int);").unwrap();
/// assert_eq!(stmts.len(), 2);
/// ```
pub fn parse_script(source: &str) -> Result<Vec<Statement>, ParseError> {
    parser::parse_script(source)
}

/// Tokenize a source string (for debugging/testing).
pub fn tokenize(source: &str) -> Vec<lexer::SpannedToken> {
    lexer::tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_with_source_context() {
        let source = "CREATE TABLE t (\n  k int PRIMARY KEY,\n  v vector<int 3>\n)";
        let err = parse(source).unwrap_err();
        let formatted = err.format_with_source(source);
        assert!(formatted.contains("line 3"));
        assert!(formatted.contains("error"));
    }

    #[test]
    fn test_every_ddl_surface_parses() {
        let sources = [
            "CREATE TABLE t (k int PRIMARY KEY, v vector<int, 1>)",
            "CREATE TYPE t (c int, v vector<int, 1>)",
            "ALTER TABLE t ADD v vector<int, 1>",
            "ALTER TYPE t ADD v vector<int, 1>",
        ];
        for source in sources {
            assert!(parse(source).is_ok(), "failed to parse {}", source);
        }
    }
}
