use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in CredVault.
///
/// No variant ever carries secret material. Messages built from parse
/// failures only include positions, never the offending text.
#[derive(Debug, Error)]
pub enum CredVaultError {
    // --- Core vault outcomes ---
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: the master credential is incorrect")]
    AuthenticationFailed,

    #[error("Vault is locked, unlock it with the master credential first")]
    SessionLocked,

    #[error("Vault data is unreadable: {0}")]
    VaultCorrupted(String),

    // --- Crypto errors ---
    #[error("Opaque data is not valid output of this transform")]
    CorruptedData,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Auth collaborator errors ---
    #[error("Auth backend error: {0}")]
    AuthBackend(String),

    // --- Storage errors ---
    #[error("Invalid slot name '{0}'")]
    InvalidSlotName(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    #[error("No vault initialized in {0}, run `credvault init` first")]
    NotInitialized(PathBuf),

    #[error("A vault is already initialized in {0}")]
    AlreadyInitialized(PathBuf),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Audit error: {0}")]
    AuditError(String),
}

impl CredVaultError {
    /// Returns `true` for the outcomes a user can act on directly:
    /// bad input, wrong credential, locked session, unreadable vault.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::AuthenticationFailed
                | Self::SessionLocked
                | Self::VaultCorrupted(_)
        )
    }
}

/// Convenience type alias for CredVault results.
pub type Result<T> = std::result::Result<T, CredVaultError>;
