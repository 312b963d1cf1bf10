//! Pluggable master-credential verification.
//!
//! The session guard is written once against `AuthBackend`; the
//! variant is picked when the vault is constructed.
//!
//! - `StaticSecretAuth`: a pre-shared secret held in memory.
//! - `HashedSecretAuth`: an Argon2id PHC string, as stored by
//!   `credvault init` in the `<slot>.auth` cell.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::crypto::kdf::{generate_salt, Argon2Params};
use crate::errors::{CredVaultError, Result};

/// Identity reported by the local backends.
const LOCAL_IDENTITY: &str = "local";

/// Decides whether a presented master credential is correct.
pub trait AuthBackend: Send + Sync {
    /// `Ok(false)` is a wrong credential.  `Err` means the backend
    /// itself could not answer.
    fn verify_credential(&self, presented: &str) -> Result<bool>;

    /// Who the backend considers signed in, if anyone.
    fn current_identity(&self) -> Option<String>;
}

/// Compares against a pre-shared secret in constant time.
pub struct StaticSecretAuth {
    secret: Zeroizing<String>,
    identity: String,
}

impl StaticSecretAuth {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
            identity: LOCAL_IDENTITY.to_string(),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }
}

impl AuthBackend for StaticSecretAuth {
    fn verify_credential(&self, presented: &str) -> Result<bool> {
        Ok(presented.as_bytes().ct_eq(self.secret.as_bytes()).into())
    }

    fn current_identity(&self) -> Option<String> {
        Some(self.identity.clone())
    }
}

/// Verifies against an Argon2id password hash in PHC string format.
#[derive(Debug, Clone)]
pub struct HashedSecretAuth {
    phc: String,
}

impl HashedSecretAuth {
    /// Wrap a stored PHC string, checking that it parses.
    pub fn new(phc: &str) -> Result<Self> {
        let phc = phc.trim();
        PasswordHash::new(phc)
            .map_err(|e| CredVaultError::AuthBackend(format!("stored verifier is malformed: {e}")))?;
        Ok(Self {
            phc: phc.to_string(),
        })
    }

    /// Hash `credential` into a PHC string suitable for `new`.
    pub fn hash(credential: &str, params: &Argon2Params) -> Result<String> {
        let salt = generate_salt();
        let salt = SaltString::encode_b64(&salt[..16])
            .map_err(|e| CredVaultError::KeyDerivationFailed(format!("salt encoding: {e}")))?;
        let argon2 = params.hasher(None)?;
        let hash = argon2
            .hash_password(credential.as_bytes(), &salt)
            .map_err(|e| CredVaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    pub fn phc(&self) -> &str {
        &self.phc
    }
}

impl AuthBackend for HashedSecretAuth {
    fn verify_credential(&self, presented: &str) -> Result<bool> {
        let parsed = PasswordHash::new(&self.phc)
            .map_err(|e| CredVaultError::AuthBackend(format!("stored verifier is malformed: {e}")))?;
        match Argon2::default().verify_password(presented.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredVaultError::AuthBackend(format!(
                "verification failed: {e}"
            ))),
        }
    }

    fn current_identity(&self) -> Option<String> {
        Some(LOCAL_IDENTITY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::kdf::MIN_MEMORY_KIB;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn static_secret_matches_exactly() {
        let auth = StaticSecretAuth::new("password123");
        assert!(auth.verify_credential("password123").unwrap());
        assert!(!auth.verify_credential("password12").unwrap());
        assert!(!auth.verify_credential("password1234").unwrap());
        assert!(!auth.verify_credential("").unwrap());
    }

    #[test]
    fn static_secret_reports_identity() {
        let auth = StaticSecretAuth::new("x").with_identity("alice");
        assert_eq!(auth.current_identity().as_deref(), Some("alice"));
    }

    #[test]
    fn hashed_secret_roundtrip() {
        let phc = HashedSecretAuth::hash("correct horse", &fast_params()).unwrap();
        assert!(phc.starts_with("$argon2id$"));
        assert!(!phc.contains("correct horse"));

        let auth = HashedSecretAuth::new(&phc).unwrap();
        assert!(auth.verify_credential("correct horse").unwrap());
        assert!(!auth.verify_credential("wrong horse").unwrap());
    }

    #[test]
    fn malformed_verifier_is_rejected() {
        assert!(matches!(
            HashedSecretAuth::new("not-a-phc-string"),
            Err(CredVaultError::AuthBackend(_))
        ));
    }
}
