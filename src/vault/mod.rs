//! Vault module: the credential collection and its at-rest form.
//!
//! This module provides:
//! - `CredentialRecord` and the closed `Category` set (`record`)
//! - The canonical versioned payload encoding (`format`)
//! - Named persistence slots, file-backed and in-memory (`slot`)
//! - `VaultStore`, category-indexed CRUD over one slot (`store`)

pub mod format;
pub mod record;
pub mod slot;
pub mod store;

// Re-export the most commonly used items.
pub use record::{Category, CredentialRecord};
pub use slot::{FileSlotStore, MemorySlotStore, SlotStore};
pub use store::VaultStore;
