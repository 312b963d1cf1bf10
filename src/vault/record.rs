//! Credential records and the closed category set.
//!
//! The JSON field names (`password`, `createdAt`) match blobs written by
//! the earlier browser build so those payloads deserialize unchanged.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{CredVaultError, Result};

/// The fixed set of groups a record can belong to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Social,
    Banking,
    #[default]
    Others,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 4] = [
        Category::Work,
        Category::Social,
        Category::Banking,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Social => "social",
            Category::Banking => "banking",
            Category::Others => "others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CredVaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "social" => Ok(Category::Social),
            "banking" => Ok(Category::Banking),
            "others" => Ok(Category::Others),
            "" => Err(CredVaultError::Validation("category cannot be empty".into())),
            other => Err(CredVaultError::Validation(format!(
                "unknown category '{other}', expected one of: work, social, banking, others"
            ))),
        }
    }
}

/// A single stored credential.
///
/// `secret` is zeroized on drop and never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRecord {
    /// Opaque unique identifier, fixed at creation.
    pub id: String,

    /// Display label for the protected account (e.g. "GitHub").
    pub service: String,

    /// Login name at that service.
    pub username: String,

    #[serde(rename = "password")]
    pub secret: String,

    #[zeroize(skip)]
    pub category: Category,

    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// Check the shape a stored record must have.
    pub(crate) fn check(&self) -> std::result::Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("record id is empty");
        }
        if self.service.trim().is_empty() {
            return Err("record service is empty");
        }
        if self.username.trim().is_empty() {
            return Err("record username is empty");
        }
        if self.secret.is_empty() {
            return Err("record secret is empty");
        }
        Ok(())
    }
}

impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("id", &self.id)
            .field("service", &self.service)
            .field("username", &self.username)
            .field("secret", &"[redacted]")
            .field("category", &self.category)
            .field("created_at", &self.created_at)
            .finish()
    }
}
