//! Terminal rendering

use calc_engine::FunctionCatalog;
use calc_history::{HistoryRecord, HistoryStats, SyncWarning};
use calc_session::{EvalSource, Evaluation};
use chrono::{DateTime, Local, Utc};
use colored::*;

pub fn print_sync_warnings(warnings: &[SyncWarning]) {
    for warning in warnings {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }
}

pub fn print_evaluation(evaluation: &Evaluation) {
    println!("{}", evaluation.result().bright_green().bold());

    if let (EvalSource::Local, Some(reason)) = (evaluation.source, &evaluation.fallback) {
        eprintln!("{} evaluated locally ({})", "Warning:".yellow(), reason);
    }
    if let Some(warning) = &evaluation.sync_warning {
        eprintln!("{} {}", "Warning:".yellow(), warning);
    }
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// One history line: short id, local time, `expression = result`
pub fn format_record(record: &HistoryRecord) -> String {
    let short_id: String = record.id.chars().take(8).collect();
    format!(
        "{:<8}  {}  {} = {}",
        short_id,
        format_timestamp(record.created_at),
        record.expression,
        record.result
    )
}

pub fn print_records(records: &[HistoryRecord]) {
    if records.is_empty() {
        println!("{}", "No history yet".dimmed());
        return;
    }
    for record in records {
        println!("{}", format_record(record));
    }
}

pub fn print_stats(stats: &HistoryStats) {
    println!("{}", "History statistics".bright_cyan().bold());
    println!("  Total:      {}", stats.total);
    println!("  Today:      {}", stats.today);
    println!("  This week:  {}", stats.this_week);
    println!("  This month: {}", stats.this_month);
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!("  Oldest:     {}", format_timestamp(oldest));
        println!("  Newest:     {}", format_timestamp(newest));
    }
}

pub fn print_functions(catalog: &FunctionCatalog) {
    println!("{}", "Operators".bright_cyan().bold());
    for op in &catalog.basic {
        println!("  {:<6} {}", op.name.bright_yellow(), op.description);
    }
    println!("{}", "Functions (scientific)".bright_cyan().bold());
    for function in &catalog.scientific {
        println!("  {:<6} {}", function.name.bright_yellow(), function.description);
    }
    println!("{}", "Constants (scientific)".bright_cyan().bold());
    for constant in &catalog.constants {
        println!(
            "  {:<6} {} ({})",
            constant.name.bright_yellow(),
            constant.description,
            constant.value
        );
    }
}
