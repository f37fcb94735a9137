//! REPL dot-command handling.

use crate::executor;
use crate::formatter::{ElementRow, Formatter, OutputFormat};
use ddlguard::core::catalog::ColumnKind;
use ddlguard::core::{TypeExpression, VectorDimensionWalker};
use ddlguard::{Principal, Session};

/// Result of executing a command.
pub enum CommandResult {
    /// Exit the REPL.
    Exit,
    /// Output to display.
    Output(String),
    /// Change the output format.
    SetFormat(OutputFormat),
    /// Continue as another principal.
    SetPrincipal(Principal),
    /// Show history.
    ShowHistory,
    /// Clear screen.
    Clear,
}

/// Parse and execute a dot-command.
pub fn handle_command(
    line: &str,
    session: &Session,
    formatter: &dyn Formatter,
    format: OutputFormat,
) -> CommandResult {
    let line = line.trim();
    let parts: Vec<&str> = line.splitn(2, ' ').collect();
    let command = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    match command.as_str() {
        ".exit" | ".quit" | ".q" => CommandResult::Exit,

        ".help" | ".h" | ".?" => match arg {
            Some("statements") | Some("ddl") => CommandResult::Output(executor::get_help_text()),
            _ => CommandResult::Output(get_help()),
        },

        ".clear" | ".cls" => CommandResult::Clear,

        ".history" => CommandResult::ShowHistory,

        ".format" => {
            if let Some(fmt) = arg {
                match fmt.to_lowercase().as_str() {
                    "table" => CommandResult::SetFormat(OutputFormat::Table),
                    "json" => CommandResult::SetFormat(OutputFormat::Json),
                    "csv" => CommandResult::SetFormat(OutputFormat::Csv),
                    _ => CommandResult::Output(format!(
                        "Unknown format '{}'. Use: table, json, csv",
                        fmt
                    )),
                }
            } else {
                CommandResult::Output(format!("Current format: {}", format))
            }
        }

        ".thresholds" => CommandResult::Output(thresholds(session, formatter, arg)),

        ".user" => match arg {
            Some(name) => CommandResult::SetPrincipal(Principal::user(name)),
            None => CommandResult::Output(format!("Executing as {}", session.principal())),
        },

        ".superuser" => {
            CommandResult::SetPrincipal(Principal::superuser(arg.unwrap_or("cassandra")))
        }

        ".anonymous" => CommandResult::SetPrincipal(Principal::Anonymous),

        ".keyspaces" => {
            let names = session.database().catalog().keyspace_names();
            CommandResult::Output(formatter.format_names("Keyspaces", &names))
        }

        ".tables" | ".types" => {
            let Some(keyspace) = arg.map(str::to_string).or_else(|| session.keyspace()) else {
                return CommandResult::Output(
                    "No keyspace selected. Use: USE <keyspace> or .tables <keyspace>".to_string(),
                );
            };
            let schema = session.database().catalog().keyspace(&keyspace);
            let (heading, names): (&str, Vec<String>) = if command == ".tables" {
                let names: Vec<String> = schema
                    .map(|s| s.table_names().into_iter().map(str::to_string).collect())
                    .unwrap_or_default();
                ("Tables", names)
            } else {
                let names: Vec<String> = schema
                    .map(|s| s.type_names().into_iter().map(str::to_string).collect())
                    .unwrap_or_default();
                ("Types", names)
            };
            CommandResult::Output(formatter.format_names(heading, &names))
        }

        ".describe" | ".desc" => match arg {
            Some(name) => CommandResult::Output(describe(session, formatter, name)),
            None => CommandResult::Output("Usage: .describe <table|type>".to_string()),
        },

        _ => CommandResult::Output(format!("Unknown command: {}", command)),
    }
}

/// Check if a line is a dot-command.
pub fn is_command(line: &str) -> bool {
    line.trim().starts_with('.')
}

/// Show the thresholds, or set them from `<warn> <fail>`.
fn thresholds(session: &Session, formatter: &dyn Formatter, arg: Option<&str>) -> String {
    let database = session.database();

    if let Some(arg) = arg {
        let values: Vec<&str> = arg.split_whitespace().collect();
        let parsed = match values.as_slice() {
            [warn, fail] => warn.parse::<i64>().ok().zip(fail.parse::<i64>().ok()),
            _ => None,
        };
        let Some((warn, fail)) = parsed else {
            return "Usage: .thresholds [<warn> <fail>] (-1 disables)".to_string();
        };
        if let Err(e) = database.set_vector_dimensions_threshold(warn, fail) {
            return formatter.format_error(&e.to_string());
        }
    }

    let guardrails = database.guardrails();
    formatter.format_thresholds(
        guardrails.vector_dimensions_warn_threshold(),
        guardrails.vector_dimensions_fail_threshold(),
    )
}

/// Describe a table or user type, optionally `keyspace.`-qualified.
fn describe(session: &Session, formatter: &dyn Formatter, name: &str) -> String {
    let (keyspace, name) = match name.split_once('.') {
        Some((keyspace, name)) => (Some(keyspace.to_string()), name),
        None => (session.keyspace(), name),
    };
    let Some(keyspace) = keyspace else {
        return "No keyspace selected. Use: USE <keyspace> or .describe <keyspace>.<name>"
            .to_string();
    };

    let catalog = session.database().catalog();
    if let Some(table) = catalog.table(&keyspace, name) {
        let rows: Vec<ElementRow> = table
            .columns
            .iter()
            .map(|column| ElementRow {
                name: column.name.clone(),
                ty: column.ty.to_string(),
                kind: column_kind(column.kind),
                vectors: catalog
                    .column_type(&keyspace, name, &column.name)
                    .ok()
                    .flatten()
                    .map(|ty| vector_dimensions(&ty))
                    .unwrap_or_default(),
            })
            .collect();
        return formatter.format_elements(&format!("TABLE {}", table.qualified_name()), &rows);
    }

    if let Some(user_type) = catalog.user_type(&keyspace, name) {
        let resolved = catalog.resolve_user_type(&keyspace, name).ok();
        let rows: Vec<ElementRow> = user_type
            .fields
            .iter()
            .map(|field| ElementRow {
                name: field.name.clone(),
                ty: field.ty.to_string(),
                kind: String::new(),
                vectors: resolved
                    .as_ref()
                    .and_then(|udt| udt.field(&field.name))
                    .map(vector_dimensions)
                    .unwrap_or_default(),
            })
            .collect();
        return formatter
            .format_elements(&format!("TYPE {}", user_type.qualified_name()), &rows);
    }

    format!("No table or type named {}.{}", keyspace, name)
}

/// Dimension counts of the vectors inside `ty`, user types expanded.
fn vector_dimensions(ty: &TypeExpression) -> String {
    VectorDimensionWalker::find(ty)
        .map(|occurrence| occurrence.dimensions.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn column_kind(kind: ColumnKind) -> String {
    match kind {
        ColumnKind::PartitionKey(i) => format!("partition key ({})", i),
        ColumnKind::Clustering(i) => format!("clustering ({})", i),
        ColumnKind::Static => "static".to_string(),
        ColumnKind::Regular => "regular".to_string(),
    }
}

/// Get help text for REPL commands.
fn get_help() -> String {
    r#"REPL Commands
=============

.thresholds               Show the vector dimension thresholds
.thresholds <warn> <fail> Set both thresholds (-1 disables)
.user [name]              Show the current principal, or run as user <name>
.superuser [name]         Run as a superuser (guardrails do not apply)
.anonymous                Run unauthenticated
.keyspaces                List keyspaces
.tables [keyspace]        List tables
.types [keyspace]         List user-defined types
.describe <name>          Show the columns of a table or fields of a type
.format [type]            Get or set output format (table, json, csv)
.history                  Show statement history
.clear                    Clear the screen
.help                     Show this help message
.help statements          Show the supported DDL
.exit / .quit             Exit the REPL

Statements end with ';' and may span several lines.
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::CsvFormatter;
    use ddlguard::Database;

    fn session() -> Session {
        let db = Database::new();
        let session = db.session(Principal::Internal).with_keyspace("ks");
        session
            .execute("CREATE TABLE t (k int, c int, v vector<int, 3> static, PRIMARY KEY(k, c))")
            .unwrap();
        session.execute("CREATE TYPE p (x int)").unwrap();
        session
    }

    fn output(result: CommandResult) -> String {
        match result {
            CommandResult::Output(text) => text,
            _ => panic!("expected output"),
        }
    }

    #[test]
    fn test_is_command() {
        assert!(is_command(".exit"));
        assert!(is_command("  .tables"));
        assert!(!is_command("CREATE TABLE t (k int PRIMARY KEY)"));
    }

    #[test]
    fn test_thresholds_command() {
        let session = session();
        let shown = output(handle_command(
            ".thresholds 8 16",
            &session,
            &CsvFormatter,
            OutputFormat::Csv,
        ));
        assert_eq!(shown, "guardrail,warn,fail\nvector_dimensions,8,16");
        assert_eq!(
            session.database().guardrails().vector_dimensions_fail_threshold(),
            Some(16)
        );

        let refused = output(handle_command(
            ".thresholds 0 16",
            &session,
            &CsvFormatter,
            OutputFormat::Csv,
        ));
        assert!(refused.starts_with("error"));
        assert_eq!(
            session.database().guardrails().vector_dimensions_warn_threshold(),
            Some(8)
        );

        let usage = output(handle_command(".thresholds 8", &session, &CsvFormatter, OutputFormat::Csv));
        assert!(usage.starts_with("Usage"));
    }

    #[test]
    fn test_listing_and_describe() {
        let session = session();
        let tables = output(handle_command(".tables", &session, &CsvFormatter, OutputFormat::Csv));
        assert_eq!(tables, "tables\nt\n");

        let types = output(handle_command(".types ks", &session, &CsvFormatter, OutputFormat::Csv));
        assert_eq!(types, "types\np\n");

        let described = output(handle_command(
            ".describe ks.t",
            &session,
            &CsvFormatter,
            OutputFormat::Csv,
        ));
        assert_eq!(
            described,
            "name,type,kind,vectors\nk,\"int\",partition key (0),\"\"\nc,\"int\",clustering (0),\"\"\nv,\"vector<int, 3>\",static,\"3\"\n"
        );

        session.execute("ALTER TYPE p ADD e vector<float, 8>").unwrap();
        session.execute("ALTER TABLE t ADD ps list<frozen<p>>").unwrap();
        let described = output(handle_command(".describe p", &session, &CsvFormatter, OutputFormat::Csv));
        assert_eq!(
            described,
            "name,type,kind,vectors\nx,\"int\",,\"\"\ne,\"vector<float, 8>\",,\"8\"\n"
        );
        let described = output(handle_command(".describe t", &session, &CsvFormatter, OutputFormat::Csv));
        assert!(described.ends_with("ps,\"list<frozen<p>>\",regular,\"8\"\n"));
    }

    #[test]
    fn test_principal_commands() {
        let session = session();
        assert!(matches!(
            handle_command(".user bob", &session, &CsvFormatter, OutputFormat::Csv),
            CommandResult::SetPrincipal(Principal::User(name)) if name == "bob"
        ));
        assert!(matches!(
            handle_command(".superuser", &session, &CsvFormatter, OutputFormat::Csv),
            CommandResult::SetPrincipal(Principal::Superuser(_))
        ));
    }
}
