//! AES-256-GCM authenticated encryption.
//!
//! Each call to `encrypt` generates a fresh random 12-byte nonce and
//! prepends it to the ciphertext.  `decrypt` splits the nonce back out
//! before decrypting.
//!
//! Layout of the returned byte buffer:
//!   [ 12-byte nonce | ciphertext + 16-byte auth tag ]
//!
//! `AeadTransform` wraps this into a text-safe sealed blob whose header
//! carries everything needed to re-derive the key at unlock:
//!
//! ```text
//! base64( [CVLT: 4 bytes][version: 1 byte][memory_kib: u32 LE][iterations: u32 LE]
//!         [parallelism: u32 LE][salt: 32 bytes][nonce: 12 bytes][ciphertext + tag] )
//! ```
//!
//! The header bytes are bound to the ciphertext as associated data, so
//! editing the stored parameters makes the blob fail to open.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::errors::{CredVaultError, Result};

use super::kdf::{derive_master_key, Argon2Params, SALT_LEN};
use super::keys::MasterKey;
use super::transform::SymmetricTransform;

/// Size of the AES-256-GCM nonce in bytes.
const NONCE_LEN: usize = 12;

/// Size of the AES-256-GCM authentication tag in bytes.
const TAG_LEN: usize = 16;

/// Magic bytes at the start of every sealed blob.
const MAGIC: &[u8; 4] = b"CVLT";

/// Current sealed blob version.
pub const SEALED_VERSION: u8 = 1;

/// 4 (magic) + 1 (version) + 3 * 4 (Argon2 params) + salt.
const HEADER_LEN: usize = 4 + 1 + 12 + SALT_LEN;

/// Encrypt `plaintext` with a 32-byte `key`.
///
/// Returns the nonce prepended to the ciphertext (nonce || ciphertext).
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_aad(key, plaintext, &[])
}

/// Like `encrypt`, additionally authenticating `aad` without encrypting it.
pub fn encrypt_with_aad(key: &[u8], plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CredVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(
            &nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CredVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut output = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

/// Decrypt data that was produced by `encrypt`.
///
/// Any failure (short input, wrong key, tampered bytes) is reported as
/// `CorruptedData`; the caller cannot tell them apart and should not.
pub fn decrypt(key: &[u8], ciphertext_with_nonce: &[u8]) -> Result<Vec<u8>> {
    decrypt_with_aad(key, ciphertext_with_nonce, &[])
}

/// Decrypt data produced by `encrypt_with_aad` with the same `aad`.
pub fn decrypt_with_aad(key: &[u8], ciphertext_with_nonce: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
    if ciphertext_with_nonce.len() < NONCE_LEN + TAG_LEN {
        return Err(CredVaultError::CorruptedData);
    }

    let (nonce_bytes, ciphertext) = ciphertext_with_nonce.split_at(NONCE_LEN);
    let nonce = Nonce::from_slice(nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CredVaultError::CorruptedData)?;

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CredVaultError::CorruptedData)
}

/// Key derivation inputs stored at the front of every sealed blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SealedHeader {
    pub params: Argon2Params,
    pub salt: [u8; SALT_LEN],
}

impl SealedHeader {
    pub fn new(params: Argon2Params, salt: [u8; SALT_LEN]) -> Self {
        Self { params, salt }
    }

    fn to_bytes(self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(MAGIC);
        out[4] = SEALED_VERSION;
        out[5..9].copy_from_slice(&self.params.memory_kib.to_le_bytes());
        out[9..13].copy_from_slice(&self.params.iterations.to_le_bytes());
        out[13..17].copy_from_slice(&self.params.parallelism.to_le_bytes());
        out[17..].copy_from_slice(&self.salt);
        out
    }

    /// Parse the header at the front of raw blob bytes.
    ///
    /// Stored parameters go through the same bounds as configured ones,
    /// so a hand-edited header cannot demand unbounded memory.
    fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < HEADER_LEN + NONCE_LEN + TAG_LEN || &raw[..4] != MAGIC {
            return Err(CredVaultError::CorruptedData);
        }
        if raw[4] != SEALED_VERSION {
            return Err(CredVaultError::CorruptedData);
        }

        let word = |at: usize| u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);
        let params = Argon2Params {
            memory_kib: word(5),
            iterations: word(9),
            parallelism: word(13),
        };
        params.validate().map_err(|_| CredVaultError::CorruptedData)?;

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(&raw[17..HEADER_LEN]);
        Ok(Self { params, salt })
    }

    /// Read the header of a sealed blob without decrypting it.
    pub fn read(opaque: &str) -> Result<Self> {
        let raw = BASE64
            .decode(opaque.trim())
            .map_err(|_| CredVaultError::CorruptedData)?;
        Self::parse(&raw)
    }
}

/// Authenticated transform keyed from the master credential.
pub struct AeadTransform {
    key: MasterKey,
    header: SealedHeader,
}

impl AeadTransform {
    /// Build a transform from an already-derived slot key and the header
    /// it was derived from.
    pub fn new(key: MasterKey, header: SealedHeader) -> Self {
        Self { key, header }
    }

    /// Derive the slot key from `credential` and `header`, then build the transform.
    pub fn derive(credential: &[u8], header: SealedHeader, slot_name: &str) -> Result<Self> {
        let master = MasterKey::new(derive_master_key(
            credential,
            &header.salt,
            &header.params,
        )?);
        let key = master.derive_slot_key(slot_name)?;
        Ok(Self::new(key, header))
    }

    pub fn header(&self) -> &SealedHeader {
        &self.header
    }
}

impl SymmetricTransform for AeadTransform {
    fn seal(&self, plaintext: &[u8]) -> Result<String> {
        let header = self.header.to_bytes();
        let sealed = encrypt_with_aad(self.key.as_bytes(), plaintext, &header)?;
        let mut blob = Vec::with_capacity(HEADER_LEN + sealed.len());
        blob.extend_from_slice(&header);
        blob.extend_from_slice(&sealed);
        Ok(BASE64.encode(blob))
    }

    fn open(&self, opaque: &str) -> Result<Vec<u8>> {
        let raw = BASE64
            .decode(opaque.trim())
            .map_err(|_| CredVaultError::CorruptedData)?;
        if SealedHeader::parse(&raw)? != self.header {
            return Err(CredVaultError::CorruptedData);
        }
        let (header, sealed) = raw.split_at(HEADER_LEN);
        decrypt_with_aad(self.key.as_bytes(), sealed, header)
    }
}
