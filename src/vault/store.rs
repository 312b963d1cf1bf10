//! In-memory credential collection backed by one persistence slot.
//!
//! `VaultStore` owns the ordered record list and knows how to move it
//! through the canonical payload format and a `SymmetricTransform` into
//! a slot.  It does not know about sessions; the facade gates access.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::transform::SymmetricTransform;
use crate::errors::{CredVaultError, Result};
use crate::session::clock::Clock;

use super::format::{decode_records, encode_records};
use super::record::{Category, CredentialRecord};
use super::slot::{validate_slot_name, SlotStore};

/// Marker between the slot name and the timestamp of a backup slot.
const CORRUPT_SUFFIX: &str = ".corrupt-";

/// The ordered credential collection plus its persistence wiring.
pub struct VaultStore {
    slots: Arc<dyn SlotStore>,
    slot_name: String,
    transform: Box<dyn SymmetricTransform>,
    clock: Arc<dyn Clock>,

    /// Records in insertion order.
    records: Vec<CredentialRecord>,

    /// Raw slot contents from a load that failed, kept so the next
    /// persist can back them up instead of silently destroying them.
    unreadable: Option<Vec<u8>>,

    /// Slot written by the most recent backup.
    last_backup: Option<String>,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty store bound to `slot_name`.  Nothing is read
    /// until `load` is called.
    pub fn new(
        slots: Arc<dyn SlotStore>,
        slot_name: &str,
        transform: Box<dyn SymmetricTransform>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        validate_slot_name(slot_name)?;
        Ok(Self {
            slots,
            slot_name: slot_name.to_string(),
            transform,
            clock,
            records: Vec::new(),
            unreadable: None,
            last_backup: None,
        })
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Replace the in-memory collection with the persisted one.
    ///
    /// An absent slot is an empty vault.  If the slot cannot be opened
    /// or parsed the collection is left empty and `VaultCorrupted` is
    /// returned; partially parsed data is never exposed.
    pub fn load(&mut self) -> Result<usize> {
        self.records.clear();
        self.unreadable = None;

        let Some(raw) = self.slots.read(&self.slot_name)? else {
            debug!(slot = %self.slot_name, "slot empty, starting with an empty vault");
            return Ok(0);
        };

        match self.decode(&raw) {
            Ok(records) => {
                self.records = records;
                debug!(slot = %self.slot_name, count = self.records.len(), "vault loaded");
                Ok(self.records.len())
            }
            Err(e) => {
                warn!(slot = %self.slot_name, error = %e, "vault slot is unreadable");
                self.unreadable = Some(raw);
                Err(e)
            }
        }
    }

    fn decode(&self, raw: &[u8]) -> Result<Vec<CredentialRecord>> {
        let text = std::str::from_utf8(raw)
            .map_err(|_| CredVaultError::VaultCorrupted("slot does not hold text data".into()))?;
        let payload = Zeroizing::new(self.transform.open(text).map_err(|_| {
            CredVaultError::VaultCorrupted("slot could not be opened with the current key".into())
        })?);
        decode_records(&payload)
    }

    /// Seal the full collection and write it to the slot.
    ///
    /// An empty collection is written as an explicit empty payload.
    pub fn persist(&mut self) -> Result<()> {
        let payload = Zeroizing::new(encode_records(&self.records)?);
        let opaque = self.transform.seal(&payload)?;

        if let Some(raw) = &self.unreadable {
            let backup = self.free_backup_slot()?;
            self.slots.write(&backup, raw)?;
            warn!(slot = %self.slot_name, backup = %backup, "backed up unreadable vault data before overwriting");
            self.last_backup = Some(backup);
        }

        self.slots.write(&self.slot_name, opaque.as_bytes())?;
        self.unreadable = None;
        debug!(slot = %self.slot_name, count = self.records.len(), "vault persisted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Append a new record and persist.
    ///
    /// `service` and `username` must contain non-whitespace text and are
    /// stored trimmed; `secret` must be non-empty and is stored as given.
    /// If persisting fails the record is not kept.
    pub fn add(
        &mut self,
        service: &str,
        username: &str,
        secret: &str,
        category: Category,
    ) -> Result<CredentialRecord> {
        let service = Self::required("service", service)?;
        let username = Self::required("username", username)?;
        if secret.is_empty() {
            return Err(CredVaultError::Validation("secret cannot be empty".into()));
        }

        let mut id = Uuid::new_v4().to_string();
        while self.contains(&id) {
            id = Uuid::new_v4().to_string();
        }

        let record = CredentialRecord {
            id,
            service: service.to_string(),
            username: username.to_string(),
            secret: secret.to_string(),
            category,
            created_at: self.clock.now(),
        };

        self.records.push(record.clone());
        if let Err(e) = self.persist() {
            self.records.pop();
            return Err(e);
        }

        info!(id = %record.id, category = %category, "credential added");
        Ok(record)
    }

    /// Remove the record with `id`.  Returns `false` when there was none,
    /// in which case nothing is written.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        let Some(pos) = self.records.iter().position(|r| r.id == id) else {
            debug!(id = %id, "remove: no such record");
            return Ok(false);
        };

        let removed = self.records.remove(pos);
        if let Err(e) = self.persist() {
            self.records.insert(pos, removed);
            return Err(e);
        }

        info!(id = %id, "credential removed");
        Ok(true)
    }

    /// Records in `category`, in insertion order.
    pub fn by_category(&self, category: Category) -> Vec<&CredentialRecord> {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .collect()
    }

    pub fn count_by_category(&self, category: Category) -> usize {
        self.records
            .iter()
            .filter(|r| r.category == category)
            .count()
    }

    /// Count for every category, zeros included, in `Category::ALL` order.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ALL
            .iter()
            .map(|&c| (c, self.count_by_category(c)))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&CredentialRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[CredentialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop the decrypted collection from memory.  The slot is untouched.
    pub fn clear(&mut self) {
        self.records.clear();
        self.unreadable = None;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn slot_name(&self) -> &str {
        &self.slot_name
    }

    /// Name of the slot the last unreadable blob was backed up to.
    pub fn last_backup(&self) -> Option<&str> {
        self.last_backup.as_deref()
    }

    /// `<slot>.corrupt-<UTC time>`, with a counter appended when that
    /// name is already taken.  Existing backups are never overwritten.
    fn free_backup_slot(&self) -> Result<String> {
        let base = format!(
            "{}{CORRUPT_SUFFIX}{}",
            self.slot_name,
            self.clock.now().format("%Y%m%dT%H%M%SZ")
        );
        if self.slots.read(&base)?.is_none() {
            return Ok(base);
        }
        let mut n = 1u32;
        loop {
            let candidate = format!("{base}-{n}");
            if self.slots.read(&candidate)?.is_none() {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// `true` after a failed `load` until the next successful `persist`.
    pub fn has_unreadable_data(&self) -> bool {
        self.unreadable.is_some()
    }

    fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CredVaultError::Validation(format!(
                "{field} cannot be empty"
            )));
        }
        Ok(trimmed)
    }
}
