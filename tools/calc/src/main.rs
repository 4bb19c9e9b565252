//! calc - command-line calculator
//!
//! Evaluates expressions remote-first with a local fallback and keeps a local
//! history that is mirrored to calcsrv when one is configured.

mod history;
mod output;
mod repl;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use calc_engine::{functions, parse_keys, Mode};
use calc_session::{CalculatorClient, ClientConfig};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::debug;

#[derive(Parser)]
#[command(name = "calc")]
#[command(about = "Calculator with remote evaluation and synced history")]
#[command(long_about = "Calculator with remote evaluation and synced history

Examples:
  calc eval '2^10'                        # Evaluate an expression
  calc --scientific keys sqrt 1 6 =       # Play back key presses
  calc --remote http://localhost:6010 repl
  calc history list --limit 5")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (YAML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// calcsrv base URL, overrides the configuration
    #[arg(short, long, global = true, value_name = "URL")]
    remote: Option<String>,

    /// Keep history local only
    #[arg(long, global = true)]
    no_sync: bool,

    /// Enable the scientific keypad (functions and constants)
    #[arg(short, long, global = true)]
    scientific: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        /// Expression, e.g. `5 + 3` or `sqrt(16)`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        expression: Vec<String>,
    },

    /// Play back a key sequence through the keypad
    Keys {
        /// Keys, e.g. `5 + 3 =` or `sqrt 1 6 =`
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },

    /// Interactive calculator
    Repl,

    /// List operators, functions and constants
    Functions,

    /// Manage calculation history
    History {
        #[command(subcommand)]
        command: history::HistoryCommands,
    },
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(remote) = &cli.remote {
        config.remote_url = Some(remote.clone());
    }
    if cli.no_sync {
        config.sync_enabled = false;
    }
    if cli.scientific {
        config.mode = Mode::Scientific;
    }
    if cli.verbose {
        config.log.level = "debug".to_string();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = load_config(&cli)?;
    let _log_guard = common::init_logging(&config.log).context("Failed to initialize logging")?;
    debug!("Configuration: {:?}", config);

    let (client, warnings) = CalculatorClient::connect(config).await?;
    output::print_sync_warnings(&warnings);

    match cli.command {
        Commands::Eval { expression } => {
            let expression = expression.join(" ");
            let evaluation = client.pipeline().evaluate(&expression).await?;
            output::print_evaluation(&evaluation);
        },
        Commands::Keys { keys } => {
            let tokens = parse_keys(&keys.join(" "))?;
            let session = client.session();
            session.press_all(tokens).await;

            match session.wait_settled().await {
                Some(Ok(evaluation)) => output::print_evaluation(&evaluation),
                Some(Err(e)) => bail!(e),
                None => {
                    let state = session.state().await;
                    println!("{} {}", state.pending_expression.dimmed(), state.display.bold());
                },
            }
        },
        Commands::Repl => repl::run(&client).await?,
        Commands::Functions => output::print_functions(&functions()),
        Commands::History { command } => history::handle_command(command, &client).await?,
    }

    Ok(())
}
