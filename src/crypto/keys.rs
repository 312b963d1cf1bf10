//! Key derivation helpers using HKDF-SHA256.
//!
//! The Argon2id master key is never used directly as a cipher key.
//! Instead we expand it with a context string bound to the slot name,
//! so two vaults sealed under the same credential and salt in different
//! slots still get independent keys.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CredVaultError, Result};

use super::kdf::KEY_LEN;

/// Derive the slot sealing key from the master key.
///
/// `info` is `"credvault-slot:<slot_name>"`.
pub fn derive_slot_key(master_key: &[u8], slot_name: &str) -> Result<[u8; KEY_LEN]> {
    let info = format!("credvault-slot:{slot_name}");
    hkdf_derive(master_key, info.as_bytes())
}

/// Run HKDF-SHA256 expand with the given `info`.
///
/// The master key already has high entropy (it came from Argon2id),
/// so it is used as input keying material with a zero salt.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| CredVaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte key that zeroes its memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the sealing key for `slot_name` from this master key.
    pub fn derive_slot_key(&self, slot_name: &str) -> Result<MasterKey> {
        let mut okm = derive_slot_key(&self.bytes, slot_name)?;
        let key = MasterKey::new(okm);
        okm.zeroize();
        Ok(key)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([redacted])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_names_produce_different_keys() {
        let master = [0x99u8; 32];
        let a = derive_slot_key(&master, "passwords").unwrap();
        let b = derive_slot_key(&master, "passwords-backup").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrapper_matches_free_function() {
        let raw = [0x44u8; 32];
        let mk = MasterKey::new(raw);
        let via_wrapper = mk.derive_slot_key("passwords").unwrap();
        let via_fn = derive_slot_key(&raw, "passwords").unwrap();
        assert_eq!(via_wrapper.as_bytes(), &via_fn);
    }

    #[test]
    fn debug_does_not_print_key_bytes() {
        let mk = MasterKey::new([0xAB; 32]);
        let printed = format!("{mk:?}");
        assert!(!printed.contains("171"));
        assert!(printed.contains("redacted"));
    }
}
