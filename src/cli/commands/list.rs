//! `credvault list`: show credentials in a table, passwords masked.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;
use crate::vault::Category;

/// Execute the `list` command.
pub fn execute(cli: &Cli, category: Option<&str>) -> Result<()> {
    let category: Option<Category> = category.map(str::parse::<Category>).transpose()?;

    let mut ctx = open_vault(cli)?;
    let records = match category {
        Some(c) => ctx.vault.by_category(c)?,
        None => ctx.vault.records()?,
    };

    let scope = category.map_or_else(|| "all categories".to_string(), |c| c.to_string());
    output::info(&format!("{scope}: {} credential(s)", records.len()));
    output::print_records_table(&records);

    ctx.vault.lock();
    Ok(())
}
