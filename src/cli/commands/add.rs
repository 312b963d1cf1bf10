//! `credvault add`: store a new credential.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{CredVaultError, Result};
use crate::vault::Category;

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    service: &str,
    username: &str,
    category: &str,
    secret: Option<&str>,
) -> Result<()> {
    // Reject a bad category before asking for anything.
    let category: Category = category.parse()?;
    let secret = read_secret(service, secret)?;

    let mut ctx = open_vault(cli)?;
    let record = ctx.vault.add(service, username, &secret, category)?;
    let total = ctx.vault.len()?;

    ctx.audit("add", Some(&record.id), Some(category.as_str()));
    output::success(&format!(
        "Added '{}' for {} under {} ({} total)",
        record.service, record.username, record.category, total
    ));
    output::tip(&format!("Id: {}", record.id));

    ctx.vault.lock();
    Ok(())
}

/// Take the password from the argument, piped stdin, or a hidden prompt.
fn read_secret(service: &str, inline: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        output::warning("Password provided on command line, it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string()));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for {service}"))
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
