//! `credvault init`: create a vault and choose its master password.

use std::sync::Arc;

use crate::cli::output;
use crate::cli::{audit_event, prompt_new_password, resolve, Cli};
use crate::errors::{CredVaultError, Result};
use crate::facade::Vault;
use crate::session::auth::HashedSecretAuth;
use crate::vault::slot::{FileSlotStore, SlotStore};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let (settings, vault_dir) = resolve(cli)?;
    let slots = Arc::new(FileSlotStore::new(&vault_dir));
    let auth_slot = settings.auth_slot();

    // 1. Refuse to replace an existing master password.
    if slots.read(&auth_slot)?.is_some() {
        output::tip("Use `credvault add` to add credentials to the existing vault.");
        return Err(CredVaultError::AlreadyInitialized(vault_dir));
    }

    // 2. Choose the master password and derive its verifier.
    let password = prompt_new_password()?;
    let verifier = HashedSecretAuth::hash(&password, &settings.argon2_params())?;
    let backend = HashedSecretAuth::new(&verifier)?;

    // 3. Open the data slot.  Data left by an earlier install is adopted
    //    when it opens under this password, never overwritten otherwise.
    let mut vault = Vault::new(settings.vault_options()?, Box::new(backend), slots.clone())?;
    match vault.unlock(&password) {
        Ok(0) => {}
        Ok(count) => output::info(&format!("Adopted {count} existing credential(s).")),
        Err(CredVaultError::VaultCorrupted(why)) => {
            vault.lock();
            return Err(CredVaultError::VaultCorrupted(format!(
                "existing data in slot '{}' could not be opened with this password ({why})",
                settings.slot_name
            )));
        }
        Err(e) => return Err(e),
    }
    vault.persist()?;
    slots.write(&auth_slot, verifier.as_bytes())?;
    vault.lock();

    output::success(&format!(
        "Vault created at {} ({} cipher)",
        vault_dir.display(),
        settings.vault_options()?.cipher.name()
    ));

    // 4. Keep slot files out of version control.
    if let Some(entry) = crate::cli::gitignore::vault_entry(&cwd, &vault_dir) {
        crate::cli::gitignore::patch_gitignore(&cwd, &entry);
    }

    audit_event(&vault_dir, &settings.slot_name, "init", None, Some("vault created"));

    output::tip("Run `credvault add <SERVICE> <USERNAME>` to add a credential.");
    output::tip("Run `credvault shell` for a session that locks itself when idle.");

    Ok(())
}
