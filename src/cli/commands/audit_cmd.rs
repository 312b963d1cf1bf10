//! `credvault audit`: show recent vault activity.
//!
//! Usage:
//!   credvault audit               # last 50 entries
//!   credvault audit --last 20
//!   credvault audit --since 24h   # also accepts 7d, 30m

use chrono::{DateTime, Duration, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::audit::{AuditEntry, AuditLog};
use crate::cli::output;
use crate::cli::{resolve, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `audit` command.  Reading the log needs no password;
/// entries never contain credential values.
pub fn execute(cli: &Cli, last: usize, since: Option<&str>) -> Result<()> {
    let (_, vault_dir) = resolve(cli)?;
    if !vault_dir.exists() {
        return Err(CredVaultError::NotInitialized(vault_dir));
    }

    let audit = AuditLog::open(&vault_dir)
        .ok_or_else(|| CredVaultError::AuditError("failed to open audit database".into()))?;

    let since = since.map(|s| parse_since(s, Utc::now())).transpose()?;
    let entries = audit.recent(last, since)?;

    if entries.is_empty() {
        output::info("No audit entries found.");
        return Ok(());
    }

    print_audit_table(&entries);
    Ok(())
}

/// Turn "7d", "24h" or "30m" into the instant that long before `now`.
fn parse_since(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();
    let invalid = || {
        CredVaultError::Validation(format!(
            "invalid duration '{input}', use a form like 7d, 24h or 30m"
        ))
    };

    let unit = input.chars().last().ok_or_else(invalid)?;
    let digits = &input[..input.len() - unit.len_utf8()];
    let n: i64 = digits.parse().map_err(|_| invalid())?;
    if n < 0 {
        return Err(invalid());
    }

    let span = match unit {
        'd' => Duration::try_days(n),
        'h' => Duration::try_hours(n),
        'm' => Duration::try_minutes(n),
        _ => None,
    }
    .ok_or_else(invalid)?;

    now.checked_sub_signed(span).ok_or_else(invalid)
}

fn print_audit_table(entries: &[AuditEntry]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Time", "Operation", "Slot", "Record", "Details"]);

    for entry in entries {
        table.add_row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            colorize_operation(&entry.operation),
            entry.slot.clone(),
            entry.record_id.clone().unwrap_or_else(|| "-".into()),
            entry.details.clone().unwrap_or_else(|| "-".into()),
        ]);
    }

    println!(
        "{}",
        style(format!("{} audit entries:", entries.len())).bold()
    );
    println!("{table}");
}

fn colorize_operation(op: &str) -> String {
    match op {
        "init" | "add" => style(op).green().to_string(),
        "unlock" | "get" | "copy" => style(op).blue().to_string(),
        "remove" | "unlock-failed" => style(op).red().to_string(),
        "lock" | "auto-lock" => style(op).yellow().to_string(),
        _ => op.to_string(),
    }
}
