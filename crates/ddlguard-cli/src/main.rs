//! ddlguard Command-Line Driver
//!
//! Runs CQL-style DDL against an in-memory schema with the vector dimensions
//! guardrail applied, interactively or from a script.

mod commands;
mod completer;
mod config;
mod executor;
mod formatter;
mod repl;

use clap::Parser;
use ddlguard::{Database, GuardrailsConfig, Principal, Session};
use formatter::{Formatter, OutputFormat};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

/// ddlguard Command-Line Driver
#[derive(Parser, Debug)]
#[command(name = "ddlguard")]
#[command(version, about = "Vector dimension guardrails for CQL-style DDL")]
pub struct Args {
    /// Execute statements and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Execute statements from file
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Guardrail configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Warn when a vector has more dimensions than this (-1 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub warn_threshold: Option<i64>,

    /// Reject vectors with more dimensions than this (-1 disables)
    #[arg(long, allow_negative_numbers = true)]
    pub fail_threshold: Option<i64>,

    /// Role exempt from guardrails, in addition to superusers (repeatable)
    #[arg(long = "exempt-role")]
    pub exempt_roles: Vec<String>,

    /// Initial keyspace
    #[arg(short = 'k', long)]
    pub keyspace: Option<String>,

    /// Role to execute as; unauthenticated if omitted
    #[arg(short = 'u', long)]
    pub user: Option<String>,

    /// Execute as a superuser, bypassing guardrails
    #[arg(long)]
    pub superuser: bool,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,
}

impl Args {
    /// The config file merged with threshold and role flags.
    pub fn guardrails_config(&self) -> Result<GuardrailsConfig, ddlguard::Error> {
        Ok(config::load(
            self.config.as_deref(),
            self.warn_threshold,
            self.fail_threshold,
            &self.exempt_roles,
        )?)
    }

    pub fn principal(&self) -> Principal {
        match (&self.user, self.superuser) {
            (Some(name), true) => Principal::superuser(name.clone()),
            (None, true) => Principal::superuser("cassandra"),
            (Some(name), false) => Principal::user(name.clone()),
            (None, false) => Principal::Anonymous,
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::from_default_env();
    let filter = match "ddlguard=info".parse::<Directive>() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = args.guardrails_config()?;
    let database = Database::with_config(&config)?;
    let mut session = database.session(args.principal());
    if let Some(keyspace) = &args.keyspace {
        session = session.with_keyspace(keyspace.clone());
    }
    let formatter = formatter::create_formatter(args.format);

    // Determine which mode to run in
    if let Some(command) = &args.command {
        Ok(run_command_mode(&session, command, &*formatter))
    } else if let Some(file) = &args.file {
        run_script_mode(&session, file, &*formatter)
    } else if std::io::stdin().is_terminal() {
        repl::run(session, args.format)?;
        Ok(ExitCode::SUCCESS)
    } else {
        let mut script = String::new();
        std::io::stdin().read_to_string(&mut script)?;
        Ok(run_script(&session, &script, &*formatter))
    }
}

/// Execute statements and exit.
fn run_command_mode(session: &Session, command: &str, formatter: &dyn Formatter) -> ExitCode {
    match executor::execute(session, command, formatter) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Execute statements from a file.
fn run_script_mode(
    session: &Session,
    file: &Path,
    formatter: &dyn Formatter,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)?;
    Ok(run_script(session, &content, formatter))
}

/// Execute every statement of a script, continuing past rejected ones.
///
/// Fails if the script does not parse or any statement was rejected.
fn run_script(session: &Session, script: &str, formatter: &dyn Formatter) -> ExitCode {
    let statements = match executor::parse(script) {
        Ok(statements) => statements,
        Err(e) => {
            eprintln!("{}", formatter.format_error(&e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let mut failed = 0usize;
    for statement in &statements {
        match executor::execute_statement(session, statement, formatter) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                failed += 1;
                eprintln!("{}", formatter.format_error(&e.to_string()));
            }
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        tracing::warn!(failed, total = statements.len(), "script finished with rejected statements");
        ExitCode::FAILURE
    }
}
