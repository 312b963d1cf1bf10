//! `credvault copy`: put a password (or username) on the clipboard.

use crate::cli::output;
use crate::cli::{open_vault, Cli};
use crate::errors::{CredVaultError, Result};

/// Execute the `copy` command.
pub fn execute(cli: &Cli, id: &str, username: bool) -> Result<()> {
    let mut ctx = open_vault(cli)?;

    let record = ctx
        .vault
        .get(id)?
        .ok_or_else(|| CredVaultError::RecordNotFound(id.to_string()))?;
    let (what, text) = if username {
        ("Username", record.username.as_str())
    } else {
        ("Password", record.secret.as_str())
    };

    to_clipboard(text)?;

    ctx.audit("copy", Some(id), Some(if username { "username" } else { "password" }));
    output::success(&format!("{what} for {} copied to clipboard", record.service));

    ctx.vault.lock();
    Ok(())
}

/// Replace the clipboard contents with `text`.
pub(crate) fn to_clipboard(text: &str) -> Result<()> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| CredVaultError::ClipboardError(e.to_string()))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| CredVaultError::ClipboardError(e.to_string()))
}
