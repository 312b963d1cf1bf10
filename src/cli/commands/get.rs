//! `credvault get`: print one credential's password to stdout.

use crate::cli::{open_vault, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `get` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let mut ctx = open_vault(cli)?;

    let record = ctx
        .vault
        .get(id)?
        .ok_or_else(|| CredVaultError::RecordNotFound(id.to_string()))?;
    ctx.audit("get", Some(id), None);

    println!("{}", record.secret);

    ctx.vault.lock();
    Ok(())
}
