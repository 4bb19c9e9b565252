//! `calc history` subcommands

use anyhow::{bail, Result};
use calc_history::HistoryError;
use calc_session::CalculatorClient;
use clap::Subcommand;
use colored::*;

use crate::output;

#[derive(Subcommand)]
pub enum HistoryCommands {
    /// Show recent calculations, newest first
    List {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Delete one record
    Delete {
        /// Record id, or an unambiguous prefix of it as shown by `list`
        id: String,
    },

    /// Delete all records
    Clear,

    /// Show counts by day, week and month
    Stats,
}

pub async fn handle_command(cmd: HistoryCommands, client: &CalculatorClient) -> Result<()> {
    let history = client.history();

    match cmd {
        HistoryCommands::List { limit } => {
            let records = history.records().await;
            let shown = records.len().min(limit);
            output::print_records(&records[..shown]);
            if records.len() > shown {
                println!("{}", format!("... {} more", records.len() - shown).dimmed());
            }
        },
        HistoryCommands::Delete { id } => {
            let id = resolve_id(client, id).await?;
            match history.delete(&id).await {
                Ok(warning) => {
                    println!("{} {}", "Deleted".green(), id);
                    output::print_sync_warnings(warning.as_slice());
                },
                Err(HistoryError::NotFound(id)) => bail!("No history record with id '{}'", id),
                Err(e) => return Err(e.into()),
            }
        },
        HistoryCommands::Clear => {
            let removed = history.len().await;
            let warning = history.clear().await;
            println!("{} {} records", "Cleared".green(), removed);
            output::print_sync_warnings(warning.as_slice());
        },
        HistoryCommands::Stats => {
            output::print_stats(&history.stats().await);
        },
    }

    Ok(())
}

/// Expand an id prefix to the one record it matches
async fn resolve_id(client: &CalculatorClient, id: String) -> Result<String> {
    let records = client.history().records().await;
    let mut matches = records.iter().filter(|record| record.id.starts_with(&id));
    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record.id.clone()),
        (Some(_), Some(_)) if !records.iter().any(|record| record.id == id) => {
            bail!("Id prefix '{}' matches more than one record", id)
        },
        _ => Ok(id),
    }
}
