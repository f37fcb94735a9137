//! Output formatters for statement results and schema listings.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use ddlguard::ExecutionResult;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// One row of a `.describe` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRow {
    pub name: String,
    pub ty: String,
    /// Column kind, empty for user type fields.
    pub kind: String,
    /// Dimension counts of every vector in the resolved type, in walk order.
    pub vectors: String,
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the result of one statement, warnings included.
    fn format_execution(&self, result: &ExecutionResult) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format a list of names under a heading.
    fn format_names(&self, heading: &str, names: &[String]) -> String;

    /// Format the columns of a table or fields of a user type.
    fn format_elements(&self, title: &str, rows: &[ElementRow]) -> String;

    /// Format the current vector dimension thresholds.
    fn format_thresholds(&self, warn: Option<u32>, fail: Option<u32>) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_execution(&self, result: &ExecutionResult) -> String {
        let mut lines = vec![if result.applied {
            format!("{} {}", result.kind, result.target)
        } else {
            format!("{} {} (skipped, already exists)", result.kind, result.target)
        }];
        for warning in &result.warnings {
            lines.push(format!("Warning: {}", warning));
        }
        lines.join("\n")
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_names(&self, heading: &str, names: &[String]) -> String {
        if names.is_empty() {
            return format!("No {}", heading.to_lowercase());
        }

        let mut table = Table::new();
        table.set_header(vec![heading]);
        for name in names {
            table.add_row(vec![name]);
        }
        table.to_string()
    }

    fn format_elements(&self, title: &str, rows: &[ElementRow]) -> String {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("name"),
            Cell::new("type"),
            Cell::new("kind"),
            Cell::new("vectors"),
        ]);
        for row in rows {
            table.add_row(vec![
                Cell::new(&row.name),
                Cell::new(&row.ty),
                Cell::new(&row.kind),
                Cell::new(&row.vectors),
            ]);
        }
        format!("{}\n{}", title, table)
    }

    fn format_thresholds(&self, warn: Option<u32>, fail: Option<u32>) -> String {
        let mut table = Table::new();
        table.set_header(vec!["guardrail", "warn", "fail"]);
        table.add_row(vec![
            "vector_dimensions".to_string(),
            threshold_text(warn),
            threshold_text(fail),
        ]);
        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_execution(&self, result: &ExecutionResult) -> String {
        serde_json::json!({
            "statement": result.kind,
            "target": result.target,
            "applied": result.applied,
            "warnings": result.warnings,
        })
        .to_string()
    }

    fn format_error(&self, error: &str) -> String {
        serde_json::json!({
            "error": error
        })
        .to_string()
    }

    fn format_names(&self, _heading: &str, names: &[String]) -> String {
        serde_json::to_string_pretty(names).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_elements(&self, title: &str, rows: &[ElementRow]) -> String {
        let rows: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "name": row.name,
                    "type": row.ty,
                    "kind": row.kind,
                    "vectors": row.vectors,
                })
            })
            .collect();
        serde_json::to_string_pretty(&serde_json::json!({
            "name": title,
            "elements": rows,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }

    fn format_thresholds(&self, warn: Option<u32>, fail: Option<u32>) -> String {
        serde_json::json!({
            "vector_dimensions_warn_threshold": warn.map_or(-1, i64::from),
            "vector_dimensions_fail_threshold": fail.map_or(-1, i64::from),
        })
        .to_string()
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_execution(&self, result: &ExecutionResult) -> String {
        format!(
            "statement,target,applied,warnings\n{},{},{},\"{}\"",
            result.kind,
            result.target,
            result.applied,
            escape_csv(&result.warnings.join("; "))
        )
    }

    fn format_error(&self, error: &str) -> String {
        format!("error\n\"{}\"", escape_csv(error))
    }

    fn format_names(&self, heading: &str, names: &[String]) -> String {
        let mut output = format!("{}\n", heading.to_lowercase());
        for name in names {
            output.push_str(&format!("{}\n", name));
        }
        output
    }

    fn format_elements(&self, _title: &str, rows: &[ElementRow]) -> String {
        let mut output = String::from("name,type,kind,vectors\n");
        for row in rows {
            output.push_str(&format!(
                "{},\"{}\",{},\"{}\"\n",
                row.name,
                escape_csv(&row.ty),
                row.kind,
                row.vectors
            ));
        }
        output
    }

    fn format_thresholds(&self, warn: Option<u32>, fail: Option<u32>) -> String {
        format!(
            "guardrail,warn,fail\nvector_dimensions,{},{}",
            threshold_text(warn),
            threshold_text(fail)
        )
    }
}

fn threshold_text(threshold: Option<u32>) -> String {
    threshold.map_or_else(|| "disabled".to_string(), |t| t.to_string())
}

/// Escape a string for CSV.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}
