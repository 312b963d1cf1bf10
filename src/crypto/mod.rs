//! Cryptographic primitives for CredVault.
//!
//! This module provides:
//! - The `SymmetricTransform` seam and the legacy XOR transform (`transform`)
//! - AES-256-GCM encryption and the sealed transform (`encryption`)
//! - Argon2id credential-based key derivation (`kdf`)
//! - HKDF-based slot key derivation (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod transform;

pub use encryption::{decrypt, encrypt, AeadTransform, SealedHeader};
pub use kdf::{derive_master_key, generate_salt, Argon2Params};
pub use keys::MasterKey;
pub use transform::{CipherScheme, SymmetricTransform, XorTransform};
