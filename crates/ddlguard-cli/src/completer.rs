//! Tab completion for the REPL.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};
use std::borrow::Cow;

/// REPL helper with completion and multi-line statement support.
pub struct DdlHelper {
    /// Table and type names of the current keyspace.
    pub names: Vec<String>,
}

impl DdlHelper {
    /// Create a new helper with no known names.
    pub fn new() -> Self {
        Self { names: Vec::new() }
    }

    /// Update the table and type names offered for completion.
    pub fn set_names(&mut self, names: Vec<String>) {
        self.names = names;
    }
}

impl Default for DdlHelper {
    fn default() -> Self {
        Self::new()
    }
}

/// Dot-commands for completion.
const DOT_COMMANDS: &[&str] = &[
    ".thresholds",
    ".user",
    ".superuser",
    ".anonymous",
    ".keyspaces",
    ".tables",
    ".types",
    ".describe",
    ".format",
    ".history",
    ".clear",
    ".help",
    ".exit",
    ".quit",
];

/// Statement keywords.
const KEYWORDS: &[&str] = &[
    "CREATE", "ALTER", "TABLE", "TYPE", "ADD", "USE", "IF", "NOT", "EXISTS", "PRIMARY", "KEY",
    "STATIC",
];

/// Type names and constructors.
const TYPES: &[&str] = &[
    "ascii", "bigint", "blob", "boolean", "counter", "date", "decimal", "double", "duration",
    "float", "inet", "int", "smallint", "text", "time", "timestamp", "timeuuid", "tinyint",
    "uuid", "varchar", "varint", "list", "set", "map", "tuple", "frozen", "vector",
];

impl Completer for DdlHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        // Dot commands at start of line
        if line_to_cursor.trim_start().starts_with('.') && !line_to_cursor.contains(' ') {
            let prefix = line_to_cursor.trim_start();
            let start = line_to_cursor.len() - prefix.len();
            let completions = DOT_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(prefix))
                .map(|cmd| pair(cmd))
                .collect();
            return Ok((start, completions));
        }

        // Find the start of the current word
        let word_start = line_to_cursor
            .rfind(|c: char| c.is_whitespace() || matches!(c, '(' | '<' | ',' | '.'))
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line_to_cursor[word_start..];
        if word.is_empty() {
            return Ok((pos, Vec::new()));
        }

        // Keywords keep the case the user started typing in
        let lower = word.to_lowercase();
        let upper = word.chars().next().is_some_and(char::is_uppercase);
        let mut completions: Vec<Pair> = KEYWORDS
            .iter()
            .filter(|kw| kw.to_lowercase().starts_with(&lower))
            .map(|kw| {
                if upper {
                    pair(kw)
                } else {
                    pair(&kw.to_lowercase())
                }
            })
            .collect();

        // Types are only meaningful after a column or field name
        if line_to_cursor.contains('(') || line_to_cursor.to_lowercase().contains(" add ") {
            completions.extend(
                TYPES
                    .iter()
                    .filter(|ty| ty.starts_with(&lower))
                    .map(|ty| pair(ty)),
            );
        }

        completions.extend(
            self.names
                .iter()
                .filter(|name| name.to_lowercase().starts_with(&lower))
                .map(|name| pair(name)),
        );

        Ok((word_start, completions))
    }
}

fn pair(text: &str) -> Pair {
    Pair {
        display: text.to_string(),
        replacement: text.to_string(),
    }
}

impl Hinter for DdlHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for DdlHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: rustyline::highlight::CmdKind) -> bool {
        false
    }
}

impl Validator for DdlHelper {
    /// Statements continue until `;`. Dot-commands are single-line.
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        Ok(if is_complete(ctx.input()) {
            ValidationResult::Valid(None)
        } else {
            ValidationResult::Incomplete
        })
    }
}

impl Helper for DdlHelper {}

/// Whether `input` can be submitted.
pub fn is_complete(input: &str) -> bool {
    let input = input.trim();
    input.is_empty() || input.starts_with('.') || input.ends_with(';')
}
