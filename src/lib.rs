#[cfg(feature = "audit-log")]
pub mod audit;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod facade;
pub mod logging;
pub mod session;
pub mod vault;

pub use errors::{CredVaultError, Result};
pub use facade::{LockPolicy, Vault, VaultOptions};
