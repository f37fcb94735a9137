//! Interactive REPL implementation.

use crate::commands::{self, CommandResult};
use crate::completer::DdlHelper;
use crate::executor;
use crate::formatter::{self, OutputFormat};
use ddlguard::Session;
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, History};
use rustyline::{Config, Editor};
use std::path::PathBuf;

/// Get the history file path.
fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ddlguard_history")
}

/// Table and type names of the session's keyspace, for completion.
fn known_names(session: &Session) -> Vec<String> {
    let Some(schema) = session
        .keyspace()
        .and_then(|keyspace| session.database().catalog().keyspace(&keyspace))
    else {
        return Vec::new();
    };
    schema
        .table_names()
        .into_iter()
        .chain(schema.type_names())
        .map(str::to_string)
        .collect()
}

/// Run the interactive REPL.
pub fn run(
    mut session: Session,
    initial_format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut format = initial_format;

    // Set up rustyline
    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();

    let mut rl: Editor<DdlHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(DdlHelper::new()));

    // Load history
    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    println!("ddlguard - Type .help for commands, .exit to quit");
    println!("Executing as {}\n", session.principal());

    // Main REPL loop
    loop {
        if let Some(helper) = rl.helper_mut() {
            helper.set_names(known_names(&session));
        }
        let prompt = match session.keyspace() {
            Some(keyspace) => format!("ddlguard:{}> ", keyspace),
            None => "ddlguard> ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let formatter = formatter::create_formatter(format);

                // Handle dot-commands
                if commands::is_command(line) {
                    match commands::handle_command(line, &session, &*formatter, format) {
                        CommandResult::Exit => {
                            println!("Goodbye!");
                            break;
                        }
                        CommandResult::Output(msg) => {
                            println!("{}", msg);
                        }
                        CommandResult::SetFormat(fmt) => {
                            format = fmt;
                            println!("Output format set to {}", format);
                        }
                        CommandResult::SetPrincipal(principal) => {
                            let keyspace = session.keyspace();
                            let next = session.database().session(principal);
                            session = match keyspace {
                                Some(keyspace) => next.with_keyspace(keyspace),
                                None => next,
                            };
                            println!("Executing as {}", session.principal());
                        }
                        CommandResult::ShowHistory => {
                            let history = rl.history();
                            let len = history.len();
                            let start = len.saturating_sub(20);
                            for (i, entry) in history.iter().skip(start).enumerate() {
                                println!("{:4}  {}", start + i + 1, entry);
                            }
                        }
                        CommandResult::Clear => {
                            // ANSI clear screen
                            print!("\x1B[2J\x1B[1;1H");
                        }
                    }
                    continue;
                }

                match executor::execute(&session, line, &*formatter) {
                    Ok(output) => {
                        if !output.is_empty() {
                            println!("{}", output);
                        }
                    }
                    Err(e) => {
                        println!("{}", formatter.format_error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&hist_path);

    Ok(())
}
