//! Symmetric transforms between plaintext bytes and the opaque,
//! text-safe form kept in a persistence slot.
//!
//! Two schemes exist:
//! - `legacy`: repeating-key XOR followed by base64.  This matches the
//!   format of vaults written by the earlier browser build, so those can
//!   still be read.  It hides content from casual inspection only.
//! - `sealed`: AES-256-GCM under a key derived from the master
//!   credential (see `encryption::AeadTransform`).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use crate::errors::{CredVaultError, Result};

use super::encryption::{AeadTransform, SealedHeader};
use super::kdf::{generate_salt, Argon2Params};

/// Pre-shared key used by the legacy scheme.
const LEGACY_KEY: &[u8] = b"YourSecureEncryptionKey123!";

/// Turns plaintext into an opaque printable string and back.
///
/// `open(seal(x)) == x` must hold for every `x`, including the empty
/// input.  `open` reports anything it cannot invert as `CorruptedData`
/// and never panics.
pub trait SymmetricTransform: Send + Sync {
    fn seal(&self, plaintext: &[u8]) -> Result<String>;
    fn open(&self, opaque: &str) -> Result<Vec<u8>>;
}

/// Repeating-key XOR stream followed by standard base64.
pub struct XorTransform {
    key: Zeroizing<Vec<u8>>,
}

impl XorTransform {
    /// Build a transform with a custom key.  The key must not be empty.
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            return Err(CredVaultError::Validation(
                "transform key cannot be empty".into(),
            ));
        }
        Ok(Self {
            key: Zeroizing::new(key.to_vec()),
        })
    }

    /// The transform used by existing legacy vaults.
    pub fn legacy() -> Self {
        Self {
            key: Zeroizing::new(LEGACY_KEY.to_vec()),
        }
    }

    fn apply(&self, input: &[u8]) -> Vec<u8> {
        input
            .iter()
            .zip(self.key.iter().cycle())
            .map(|(b, k)| b ^ k)
            .collect()
    }
}

impl SymmetricTransform for XorTransform {
    fn seal(&self, plaintext: &[u8]) -> Result<String> {
        Ok(BASE64.encode(self.apply(plaintext)))
    }

    fn open(&self, opaque: &str) -> Result<Vec<u8>> {
        let raw = BASE64
            .decode(opaque.trim())
            .map_err(|_| CredVaultError::CorruptedData)?;
        Ok(self.apply(&raw))
    }
}

/// Which transform a vault is sealed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherScheme {
    /// Fixed-key XOR + base64.
    Legacy,
    /// AES-256-GCM keyed by Argon2id(master credential, salt).  The
    /// params are used for new vaults only; an existing blob is always
    /// opened with the params stored in its header.
    Sealed(Argon2Params),
}

impl Default for CipherScheme {
    fn default() -> Self {
        Self::Sealed(Argon2Params::default())
    }
}

impl CipherScheme {
    /// Build the transform for an unlocked session.
    ///
    /// For `Sealed`, the salt and Argon2 params come from the header of
    /// the currently persisted blob when it has one.  An empty or
    /// unreadable slot gets a fresh salt and the configured params.
    pub fn transform_for(
        &self,
        credential: &[u8],
        slot_name: &str,
        existing: Option<&str>,
    ) -> Result<Box<dyn SymmetricTransform>> {
        match self {
            Self::Legacy => Ok(Box::new(XorTransform::legacy())),
            Self::Sealed(params) => {
                let header = match existing.map(SealedHeader::read) {
                    Some(Ok(stored)) => stored,
                    _ => SealedHeader::new(*params, generate_salt()),
                };
                let transform = AeadTransform::derive(credential, header, slot_name)?;
                Ok(Box::new(transform))
            }
        }
    }

    /// Short lowercase name, as used in `.credvault.toml`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Sealed(_) => "sealed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::MIN_MEMORY_KIB;

    #[test]
    fn legacy_roundtrip_including_empty() {
        let t = XorTransform::legacy();
        for input in [&b""[..], b"a", b"[{\"id\":\"1\"}]", &[0u8, 255, 128, 7]] {
            let sealed = t.seal(input).unwrap();
            assert_eq!(t.open(&sealed).unwrap(), input);
        }
    }

    #[test]
    fn legacy_output_is_printable_and_hides_plaintext() {
        let t = XorTransform::legacy();
        let sealed = t.seal(b"service=GitHub password=s3cr3t").unwrap();
        assert!(sealed.bytes().all(|b| b.is_ascii_graphic()));
        assert!(!sealed.contains("GitHub"));
    }

    #[test]
    fn legacy_matches_known_vector() {
        // 'a' ^ 'Y' = 0x38 ('8'), base64("8") == "OA=="
        let t = XorTransform::legacy();
        assert_eq!(t.seal(b"a").unwrap(), "OA==");
    }

    #[test]
    fn legacy_open_rejects_bad_encoding() {
        let t = XorTransform::legacy();
        assert!(matches!(t.open("abc"), Err(CredVaultError::CorruptedData)));
        assert!(matches!(t.open("@@@@"), Err(CredVaultError::CorruptedData)));
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(XorTransform::new(b"").is_err());
        assert!(XorTransform::new(b"k").is_ok());
    }

    #[test]
    fn sealed_scheme_reuses_salt_from_existing_blob() {
        let scheme = CipherScheme::Sealed(Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        });
        let first = scheme.transform_for(b"pw", "passwords", None).unwrap();
        let blob = first.seal(b"hello").unwrap();

        let second = scheme
            .transform_for(b"pw", "passwords", Some(&blob))
            .unwrap();
        assert_eq!(second.open(&blob).unwrap(), b"hello");
    }

    #[test]
    fn sealed_scheme_opens_with_stored_params_after_config_change() {
        let original = CipherScheme::Sealed(Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        });
        let blob = original
            .transform_for(b"pw", "passwords", None)
            .unwrap()
            .seal(b"hello")
            .unwrap();

        let retuned = CipherScheme::Sealed(Argon2Params {
            memory_kib: MIN_MEMORY_KIB * 2,
            iterations: 2,
            parallelism: 1,
        });
        let reopened = retuned
            .transform_for(b"pw", "passwords", Some(&blob))
            .unwrap();
        assert_eq!(reopened.open(&blob).unwrap(), b"hello");

        // Re-sealing keeps the vault on its original params.
        let resealed = reopened.seal(b"hello").unwrap();
        assert_eq!(
            SealedHeader::read(&resealed).unwrap().params.memory_kib,
            MIN_MEMORY_KIB
        );
    }

    #[test]
    fn scheme_names() {
        assert_eq!(CipherScheme::Legacy.name(), "legacy");
        assert_eq!(CipherScheme::default().name(), "sealed");
    }
}
