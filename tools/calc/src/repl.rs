//! Interactive calculator
//!
//! Plain lines are evaluated as expressions. Lines starting with `:` are
//! commands; `:keys` drives a keypad session that persists across lines.

use anyhow::{Context, Result};
use calc_engine::{parse_keys, Constant, Mode, UnaryFunction};
use calc_session::{CalculatorClient, CalculatorSession};
use colored::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

use crate::output;

const COMMANDS: [&str; 8] = [
    ":keys", ":history", ":stats", ":clear", ":sync", ":mode", ":help", ":quit",
];

// ============================================================================
// Tab Completion Helper
// ============================================================================

/// Completes `:` commands and, in scientific mode, function and constant names
struct CalcHelper {
    mode: Mode,
}

impl Helper for CalcHelper {}

impl Hinter for CalcHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for CalcHelper {}

impl Validator for CalcHelper {}

impl Completer for CalcHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with(':') && !line.contains(' ') {
            return Ok((0, candidates(COMMANDS.iter().copied(), line)));
        }
        if self.mode == Mode::Basic {
            return Ok((pos, vec![]));
        }

        let start = line
            .char_indices()
            .rfind(|(_, c)| !c.is_ascii_alphanumeric())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let word = &line[start..];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let names = UnaryFunction::ALL
            .iter()
            .map(|f| f.name())
            .chain(Constant::ALL.iter().map(|c| c.name()));
        Ok((start, candidates(names, word)))
    }
}

fn candidates<'a>(names: impl Iterator<Item = &'a str>, prefix: &str) -> Vec<Pair> {
    names
        .filter(|name| name.starts_with(prefix))
        .map(|name| Pair {
            display: name.to_string(),
            replacement: name.to_string(),
        })
        .collect()
}

// ============================================================================
// REPL loop
// ============================================================================

pub async fn run(client: &CalculatorClient) -> Result<()> {
    let config = rustyline::Config::builder()
        .completion_type(rustyline::CompletionType::List)
        .build();
    let mut rl = Editor::with_config(config).context("Failed to initialize readline")?;
    let mut session = client.session();
    rl.set_helper(Some(CalcHelper {
        mode: session.mode(),
    }));

    println!("{}", "calc".bright_cyan().bold());
    println!(
        "Type an expression, '{}' for commands, {} for completion\n",
        ":help".bright_yellow(),
        "Tab".bright_cyan()
    );

    loop {
        match rl.readline("calc> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                match execute(client, &mut session, line).await {
                    Ok(true) => {
                        if let Some(helper) = rl.helper_mut() {
                            helper.mode = session.mode();
                        }
                    },
                    Ok(false) => break,
                    Err(e) => eprintln!("{} {}", "Error:".red(), e),
                }
            },
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            },
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{} {}", "Readline error:".red(), e);
                break;
            },
        }
    }

    println!("Bye!");
    Ok(())
}

/// Execute one line; Ok(false) quits
async fn execute(
    client: &CalculatorClient,
    session: &mut CalculatorSession,
    input: &str,
) -> Result<bool> {
    let Some(command) = input.strip_prefix(':') else {
        let evaluation = client.pipeline().evaluate(input).await?;
        output::print_evaluation(&evaluation);
        return Ok(true);
    };

    let (name, args) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, args)| (name, args.trim()));
    let history = client.history();

    match name {
        "keys" | "k" => {
            session.press_all(parse_keys(args)?).await;
            if let Some(Err(e)) = session.wait_settled().await {
                eprintln!("{} {}", "Error:".red(), e);
            }
            let state = session.state().await;
            println!("{} {}", state.pending_expression.dimmed(), state.display.bold());
        },
        "history" | "h" => {
            let limit = args.parse().unwrap_or(10);
            let records = history.records().await;
            output::print_records(&records[..records.len().min(limit)]);
        },
        "stats" => output::print_stats(&history.stats().await),
        "clear" => {
            let warning = history.clear().await;
            println!("{}", "History cleared".green());
            output::print_sync_warnings(warning.as_slice());
        },
        "sync" => match args {
            "on" | "off" => {
                let warnings = history.set_sync_enabled(args == "on").await;
                output::print_sync_warnings(&warnings);
                println!("Sync {}", args.bold());
            },
            _ => {
                let state = if history.sync_enabled() { "on" } else { "off" };
                println!("Sync is {}", state.bold());
            },
        },
        "mode" => {
            let mode = match args {
                "basic" => Mode::Basic,
                "scientific" | "sci" => Mode::Scientific,
                _ => {
                    println!("Usage: :mode basic|scientific");
                    return Ok(true);
                },
            };
            *session = client.session_with_mode(mode);
            println!("Keypad mode {}", args.bold());
        },
        "help" | "?" => print_help(),
        "quit" | "exit" | "q" => return Ok(false),
        unknown => println!(
            "Unknown command ':{}'. Type '{}' for available commands.",
            unknown.red(),
            ":help".bright_yellow()
        ),
    }

    Ok(true)
}

fn print_help() {
    println!("{}", "Commands".bright_cyan().bold());
    println!("  <expression>         evaluate, e.g. 2^10 or sqrt(16)");
    println!("  :keys <keys>         press keys on the keypad, e.g. :keys 5 + 3 =");
    println!("  :history [n]         show the n most recent calculations");
    println!("  :stats               history statistics");
    println!("  :clear               delete all history");
    println!("  :sync on|off         toggle mirroring to the remote history");
    println!("  :mode basic|scientific");
    println!("  :quit                leave");
}
