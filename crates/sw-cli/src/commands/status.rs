//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sw_core::VersionTable;
use sw_migrate::{StatusReport, StatusSummary};

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::print_table;
use crate::context::RuntimeContext;

/// JSON view of a status report
#[derive(Debug, Serialize)]
struct StatusDocument {
    keyspace: String,
    migrations_table: String,
    keyspace_exists: bool,
    table_exists: bool,
    current_version: Option<i32>,
    latest_version: usize,
    up_to_date: bool,
    applied: Vec<AppliedEntry>,
    pending: Vec<PendingEntry>,
}

#[derive(Debug, Serialize)]
struct AppliedEntry {
    version: i32,
    name: String,
    state: String,
    applied_at: Option<String>,
    checksum: String,
}

#[derive(Debug, Serialize)]
struct PendingEntry {
    version: i32,
    name: String,
    checksum: String,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let migrator = ctx.migrator();
    let report = migrator.status()?;

    match args.output {
        StatusOutput::Table => print_report(&report),
        StatusOutput::Json => {
            let document =
                build_document(&report, migrator.table(), ctx.project.latest_version());
            let json = serde_json::to_string_pretty(&document)
                .context("Failed to serialize status")?;
            println!("{}", json);
        }
    }
    Ok(())
}

fn print_report(report: &StatusReport) {
    match report {
        StatusReport::KeyspaceMissing { keyspace } => {
            println!("Keyspace '{}' does not exist", keyspace);
        }
        StatusReport::TableMissing { table } => {
            println!(
                "Migration table '{}' does not exist in keyspace '{}'",
                table.table, table.keyspace
            );
        }
        StatusReport::Ready(summary) => print_summary(summary),
    }
}

fn print_summary(summary: &StatusSummary) {
    let current = summary
        .current_version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("Keyspace:            {}", summary.table.keyspace);
    println!("Migrations table:    {}", summary.table.table);
    println!("Current DB version:  {}", current);
    println!("Latest DB version:   {}", summary.latest_version);

    let (applied, pending) = summary_entries(summary);

    if !applied.is_empty() {
        println!("\n## Applied migrations\n");
        let rows: Vec<Vec<String>> = applied
            .into_iter()
            .map(|entry| {
                vec![
                    entry.version.to_string(),
                    entry.name,
                    entry.state,
                    entry.applied_at.unwrap_or_default(),
                    entry.checksum,
                ]
            })
            .collect();
        print_table(&["#", "Name", "State", "Date applied", "Checksum"], &rows);
    }

    if !pending.is_empty() {
        println!("\n## Pending migrations\n");
        let rows: Vec<Vec<String>> = pending
            .into_iter()
            .map(|entry| vec![entry.version.to_string(), entry.name, entry.checksum])
            .collect();
        print_table(&["#", "Name", "Checksum"], &rows);
    }

    if summary.is_up_to_date() {
        println!("\nDatabase is up-to-date");
    }
}

fn summary_entries(summary: &StatusSummary) -> (Vec<AppliedEntry>, Vec<PendingEntry>) {
    let applied = summary
        .applied
        .iter()
        .map(|record| AppliedEntry {
            version: record.version,
            name: record.name.clone(),
            state: record.state.to_string(),
            applied_at: record
                .applied_at
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            checksum: record.checksum_hex(),
        })
        .collect();
    let pending = summary
        .pending
        .iter()
        .map(|p| PendingEntry {
            version: p.version,
            name: p.name.clone(),
            checksum: p.checksum.clone(),
        })
        .collect();
    (applied, pending)
}

fn build_document(
    report: &StatusReport,
    table: &VersionTable,
    latest_version: usize,
) -> StatusDocument {
    match report {
        StatusReport::KeyspaceMissing { .. } => StatusDocument {
            keyspace: table.keyspace.to_string(),
            migrations_table: table.table.to_string(),
            keyspace_exists: false,
            table_exists: false,
            current_version: None,
            latest_version,
            up_to_date: latest_version == 0,
            applied: Vec::new(),
            pending: Vec::new(),
        },
        StatusReport::TableMissing { .. } => StatusDocument {
            keyspace: table.keyspace.to_string(),
            migrations_table: table.table.to_string(),
            keyspace_exists: true,
            table_exists: false,
            current_version: None,
            latest_version,
            up_to_date: latest_version == 0,
            applied: Vec::new(),
            pending: Vec::new(),
        },
        StatusReport::Ready(summary) => {
            let (applied, pending) = summary_entries(summary);
            StatusDocument {
                keyspace: table.keyspace.to_string(),
                migrations_table: table.table.to_string(),
                keyspace_exists: true,
                table_exists: true,
                current_version: summary.current_version,
                latest_version: summary.latest_version,
                up_to_date: summary.is_up_to_date(),
                applied,
                pending,
            }
        }
    }
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
