//! `credvault remove`: delete a credential by id.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    let mut ctx = open_vault(cli)?;

    let Some(record) = ctx.vault.get(id)? else {
        output::info(&format!("No credential with id '{id}'. Nothing removed."));
        ctx.vault.lock();
        return Ok(());
    };

    // Unless --force is set, ask for confirmation before removing.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove {} credential for {}?",
                record.service, record.username
            ))
            .default(false)
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            ctx.vault.lock();
            return Ok(());
        }
    }

    if ctx.vault.remove(id)? {
        ctx.audit("remove", Some(id), Some(record.category.as_str()));
        output::success(&format!(
            "Removed {} credential for {}",
            record.service, record.username
        ));
    }

    ctx.vault.lock();
    Ok(())
}
