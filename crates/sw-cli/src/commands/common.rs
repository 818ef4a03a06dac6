//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::io::{BufRead, IsTerminal, Write};
use sw_migrate::AppliedMigration;

/// Ask before an operation that cannot be undone.
///
/// Only prompts when stdin is a terminal and `assume_yes` is not set;
/// non-interactive runs always proceed.
pub(crate) fn confirm(operation: &str, assume_yes: bool) -> Result<bool> {
    let stdin = std::io::stdin();
    if assume_yes || !stdin.is_terminal() {
        return Ok(true);
    }

    print!("The {operation} operation cannot be undone. Are you sure? [y/N] ");
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    stdin
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(is_affirmative(&answer))
}

fn is_affirmative(answer: &str) -> bool {
    answer.trim_start().to_lowercase().starts_with('y')
}

/// Print one line per migration applied or skipped by a run.
pub(crate) fn print_applied(applied: &[AppliedMigration]) {
    if applied.is_empty() {
        println!("Nothing to do, database is up to date.");
        return;
    }
    for migration in applied {
        println!(
            "  {:>4}  {:<9}  {}",
            migration.version,
            migration.state.as_str(),
            migration.name
        );
    }
    println!();
    println!("{} migration(s) recorded", applied.len());
}

// ---------------------------------------------------------------------------
// Table-printing utilities
// ---------------------------------------------------------------------------

/// Calculate column widths for a table given headers and row data.
///
/// Widths are measured in characters so non-ASCII names still align.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// ```ignore
/// print_table(
///     &["#", "NAME"],
///     &[vec!["1".into(), "v1_init.sql".into()]],
/// );
/// // #  NAME
/// // -  -----------
/// // 1  v1_init.sql
/// ```
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}
