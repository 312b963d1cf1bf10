use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::crypto::transform::CipherScheme;
use crate::errors::{CredVaultError, Result};
use crate::facade::{LockPolicy, VaultOptions};

/// Project-level configuration, loaded from `.credvault.toml`.
///
/// Every field has a sensible default so CredVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to the working directory) holding slot files.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Name of the slot that holds the vault.
    #[serde(default = "default_slot_name")]
    pub slot_name: String,

    /// "sealed" (AES-256-GCM, default) or "legacy" (fixed-key XOR).
    #[serde(default = "default_cipher")]
    pub cipher: String,

    /// Seconds of inactivity before the session locks (default: 300).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// "evict" (default) or "retain".
    #[serde(default = "default_lock_policy")]
    pub lock_policy: String,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".credvault".to_string()
}

fn default_slot_name() -> String {
    crate::facade::DEFAULT_SLOT.to_string()
}

fn default_cipher() -> String {
    "sealed".to_string()
}

fn default_idle_timeout_secs() -> u64 {
    300 // 5 minutes
}

fn default_lock_policy() -> String {
    "evict".to_string()
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            slot_name: default_slot_name(),
            cipher: default_cipher(),
            idle_timeout_secs: default_idle_timeout_secs(),
            lock_policy: default_lock_policy(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the working directory.
    pub const FILE_NAME: &'static str = ".credvault.toml";

    /// Load settings from `<project_dir>/.credvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            CredVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Directory holding slot files.
    ///
    /// Example: `project_dir/.credvault`
    pub fn vault_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_dir)
    }

    /// Slot holding the master-credential verifier.
    pub fn auth_slot(&self) -> String {
        format!("{}.auth", self.slot_name)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    pub fn cipher_scheme(&self) -> Result<CipherScheme> {
        match self.cipher.trim().to_ascii_lowercase().as_str() {
            "sealed" => Ok(CipherScheme::Sealed(self.argon2_params())),
            "legacy" => Ok(CipherScheme::Legacy),
            other => Err(CredVaultError::ConfigError(format!(
                "unknown cipher '{other}', expected 'sealed' or 'legacy'"
            ))),
        }
    }

    pub fn lock_policy(&self) -> Result<LockPolicy> {
        match self.lock_policy.trim().to_ascii_lowercase().as_str() {
            "evict" => Ok(LockPolicy::Evict),
            "retain" => Ok(LockPolicy::Retain),
            other => Err(CredVaultError::ConfigError(format!(
                "unknown lock_policy '{other}', expected 'evict' or 'retain'"
            ))),
        }
    }

    pub fn idle_timeout(&self) -> Result<Duration> {
        let secs = i64::try_from(self.idle_timeout_secs)
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| {
                CredVaultError::ConfigError(format!(
                    "idle_timeout_secs must be between 1 and {} (got {})",
                    i64::MAX,
                    self.idle_timeout_secs
                ))
            })?;
        Duration::try_seconds(secs).ok_or_else(|| {
            CredVaultError::ConfigError(format!("idle_timeout_secs {secs} is out of range"))
        })
    }

    /// Everything the facade needs, validated.
    pub fn vault_options(&self) -> Result<VaultOptions> {
        Ok(VaultOptions {
            slot_name: self.slot_name.clone(),
            cipher: self.cipher_scheme()?,
            idle_timeout: self.idle_timeout()?,
            lock_policy: self.lock_policy()?,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_dir, ".credvault");
        assert_eq!(s.slot_name, "passwords");
        assert_eq!(s.cipher, "sealed");
        assert_eq!(s.idle_timeout_secs, 300);
        assert_eq!(s.lock_policy, "evict");
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.slot_name, "passwords");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_dir = "secrets"
slot_name = "personal"
cipher = "legacy"
idle_timeout_secs = 60
lock_policy = "retain"
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
"#;
        fs::write(tmp.path().join(".credvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_dir, "secrets");
        assert_eq!(settings.slot_name, "personal");
        assert_eq!(settings.cipher_scheme().unwrap(), CipherScheme::Legacy);
        assert_eq!(settings.idle_timeout().unwrap(), Duration::seconds(60));
        assert_eq!(settings.lock_policy().unwrap(), LockPolicy::Retain);
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credvault.toml"), "idle_timeout_secs = 120\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.idle_timeout_secs, 120);
        assert_eq!(settings.vault_dir, ".credvault");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".credvault.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(CredVaultError::ConfigError(_))));
    }

    #[test]
    fn unknown_cipher_and_policy_are_config_errors() {
        let s = Settings {
            cipher: "rot13".into(),
            lock_policy: "forget".into(),
            ..Settings::default()
        };
        assert!(s.cipher_scheme().is_err());
        assert!(s.lock_policy().is_err());
        assert!(s.vault_options().is_err());
    }

    #[test]
    fn zero_idle_timeout_is_rejected() {
        let s = Settings {
            idle_timeout_secs: 0,
            ..Settings::default()
        };
        assert!(s.idle_timeout().is_err());
    }

    #[test]
    fn sealed_cipher_carries_argon2_params() {
        let s = Settings {
            argon2_iterations: 7,
            ..Settings::default()
        };
        match s.cipher_scheme().unwrap() {
            CipherScheme::Sealed(p) => assert_eq!(p.iterations, 7),
            CipherScheme::Legacy => panic!("expected sealed"),
        }
    }

    #[test]
    fn paths_and_slot_names() {
        let s = Settings::default();
        assert_eq!(
            s.vault_dir(Path::new("/home/user/project")),
            PathBuf::from("/home/user/project/.credvault")
        );
        assert_eq!(s.auth_slot(), "passwords.auth");
    }
}
