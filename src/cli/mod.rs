//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod gitignore;
pub mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{CredVaultError, Result};
use crate::facade::Vault;
use crate::session::auth::HashedSecretAuth;
use crate::vault::slot::{FileSlotStore, SlotStore};

/// Minimum master credential length to prevent trivially weak choices.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable read before prompting for the master credential.
pub const PASSWORD_ENV: &str = "CREDVAULT_PASSWORD";

/// CredVault CLI: encrypted credential vault.
#[derive(Parser)]
#[command(
    name = "credvault",
    about = "Encrypted personal credential vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: from .credvault.toml, else .credvault)
    #[arg(long, global = true)]
    pub vault_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Initialize a new vault and choose the master credential
    Init,

    /// Add a credential
    Add {
        /// Service name (e.g. GitHub)
        service: String,
        /// Username or email at that service
        username: String,
        /// Category: work, social, banking, others
        #[arg(short, long, default_value = "others")]
        category: String,
        /// Password value (omit for interactive prompt)
        secret: Option<String>,
    },

    /// List credentials (passwords are masked)
    List {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Print a credential's password
    Get {
        /// Record id (see `credvault list`)
        id: String,
    },

    /// Copy a credential's password to the clipboard
    Copy {
        /// Record id
        id: String,
        /// Copy the username instead of the password
        #[arg(long)]
        username: bool,
    },

    /// Remove a credential
    Remove {
        /// Record id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show how many credentials each category holds
    Summary,

    /// Start an interactive session that locks itself when idle
    Shell,

    /// View the audit log of vault operations
    #[cfg(feature = "audit-log")]
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load `.credvault.toml` from the working directory and resolve the
/// vault directory, letting `--vault-dir` override the config file.
pub fn resolve(cli: &Cli) -> Result<(Settings, PathBuf)> {
    let cwd = std::env::current_dir()?;
    let mut settings = Settings::load(&cwd)?;
    if let Some(dir) = &cli.vault_dir {
        settings.vault_dir = dir.clone();
    }
    let dir = settings.vault_dir(&cwd);
    Ok((settings, dir))
}

/// An unlocked vault plus what commands need to report on it.
pub struct VaultContext {
    pub settings: Settings,
    pub vault_dir: PathBuf,
    pub vault: Vault,
}

impl VaultContext {
    /// Record an audit event for this vault.  Never fails.
    pub fn audit(&self, op: &str, record_id: Option<&str>, details: Option<&str>) {
        audit_event(&self.vault_dir, &self.settings.slot_name, op, record_id, details);
    }

    /// Prompt for the master credential and unlock.
    ///
    /// Unreadable vault data is reported as a warning and the session
    /// continues over an empty vault.
    pub fn unlock_interactive(&mut self) -> Result<()> {
        let password = prompt_password()?;
        match self.vault.unlock(&password) {
            Ok(_) => {
                self.audit("unlock", None, None);
                Ok(())
            }
            Err(CredVaultError::VaultCorrupted(why)) => {
                self.audit("unlock", None, Some("vault data unreadable"));
                output::warning(&format!("Vault data could not be read: {why}"));
                output::tip(&format!(
                    "The unreadable data will be saved to '{}.corrupt-<time>' before the next change.",
                    self.settings.slot_name
                ));
                Ok(())
            }
            Err(e @ CredVaultError::AuthenticationFailed) => {
                self.audit("unlock-failed", None, None);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }
}

/// Build the vault described by the config and unlock it.
pub fn open_vault(cli: &Cli) -> Result<VaultContext> {
    let mut ctx = prepare_vault(cli)?;
    ctx.unlock_interactive()?;
    Ok(ctx)
}

/// Build the vault described by the config, still locked.
///
/// Fails with `NotInitialized` when no master password was ever chosen.
pub fn prepare_vault(cli: &Cli) -> Result<VaultContext> {
    let (settings, vault_dir) = resolve(cli)?;
    let slots = Arc::new(FileSlotStore::new(&vault_dir));

    let verifier = slots
        .read(&settings.auth_slot())?
        .ok_or_else(|| CredVaultError::NotInitialized(vault_dir.clone()))?;
    let verifier = String::from_utf8(verifier)
        .map_err(|_| CredVaultError::AuthBackend("stored verifier is not text".into()))?;
    let backend = HashedSecretAuth::new(&verifier)?;

    let vault = Vault::new(settings.vault_options()?, Box::new(backend), slots)?;

    Ok(VaultContext {
        settings,
        vault_dir,
        vault,
    })
}

/// Log an audit event if audit support is compiled in.
pub fn audit_event(
    vault_dir: &Path,
    slot: &str,
    op: &str,
    record_id: Option<&str>,
    details: Option<&str>,
) {
    #[cfg(feature = "audit-log")]
    crate::audit::log_audit(
        vault_dir,
        crate::audit::AuditEvent {
            operation: op,
            slot,
            record_id,
            details,
        },
    );

    #[cfg(not(feature = "audit-log"))]
    let _ = (vault_dir, slot, op, record_id, details);
}

/// Get the master credential, trying in order:
/// 1. `CREDVAULT_PASSWORD` env var (scripts, CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the credential is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master credential with confirmation (used during `init`).
///
/// Also respects `CREDVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            validate_new_password(&pw)?;
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| CredVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if let Err(e) = validate_new_password(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Check a new master credential against the minimum length.
pub fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredVaultError::Validation(format!(
            "master password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
