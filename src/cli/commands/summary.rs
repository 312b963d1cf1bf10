//! `credvault summary`: count credentials per category.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::Result;

/// Execute the `summary` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut ctx = open_vault(cli)?;
    let counts = ctx.vault.category_counts()?;
    output::print_summary(&counts);
    ctx.vault.lock();
    Ok(())
}
