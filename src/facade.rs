//! `Vault`: the session guard and the vault store behind one handle.
//!
//! Every read or write of credential data goes through here.  While the
//! session is locked those calls fail with `SessionLocked` and never
//! reach the store or the slot.  Successful calls count as activity.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use crate::crypto::transform::CipherScheme;
use crate::errors::{CredVaultError, Result};
use crate::session::auth::AuthBackend;
use crate::session::clock::{Clock, SystemClock};
use crate::session::guard::{SessionGuard, SessionState};
use crate::vault::record::{Category, CredentialRecord};
use crate::vault::slot::{validate_slot_name, SlotStore};
use crate::vault::store::VaultStore;

/// Default slot holding the vault.
pub const DEFAULT_SLOT: &str = "passwords";

/// Default idle threshold: five minutes.
pub const DEFAULT_IDLE_SECS: i64 = 300;

/// What happens to decrypted data when the session locks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockPolicy {
    /// Drop the decrypted records and key material.
    #[default]
    Evict,
    /// Keep them resident but unreachable until the next unlock.
    Retain,
}

/// Construction-time settings for a `Vault`.
#[derive(Debug, Clone)]
pub struct VaultOptions {
    pub slot_name: String,
    pub cipher: CipherScheme,
    pub idle_timeout: Duration,
    pub lock_policy: LockPolicy,
}

impl Default for VaultOptions {
    fn default() -> Self {
        Self {
            slot_name: DEFAULT_SLOT.to_string(),
            cipher: CipherScheme::default(),
            idle_timeout: Duration::seconds(DEFAULT_IDLE_SECS),
            lock_policy: LockPolicy::default(),
        }
    }
}

/// A single-session credential vault.
pub struct Vault {
    guard: SessionGuard,
    slots: Arc<dyn SlotStore>,
    clock: Arc<dyn Clock>,
    options: VaultOptions,
    /// Present after an unlock; dropped on lock under `LockPolicy::Evict`.
    store: Option<VaultStore>,
}

impl Vault {
    /// Create a locked vault using the system clock.
    pub fn new(
        options: VaultOptions,
        backend: Box<dyn AuthBackend>,
        slots: Arc<dyn SlotStore>,
    ) -> Result<Self> {
        Self::with_clock(options, backend, slots, Arc::new(SystemClock))
    }

    /// Create a locked vault with an explicit time source.
    pub fn with_clock(
        options: VaultOptions,
        backend: Box<dyn AuthBackend>,
        slots: Arc<dyn SlotStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        validate_slot_name(&options.slot_name)?;
        if options.idle_timeout <= Duration::zero() {
            return Err(CredVaultError::ConfigError(
                "idle timeout must be positive".into(),
            ));
        }
        Ok(Self {
            guard: SessionGuard::new(backend, clock.clone()),
            slots,
            clock,
            options,
            store: None,
        })
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Verify `presented`, then load the persisted collection.
    ///
    /// Returns the number of records loaded.  If the slot holds data that
    /// cannot be read, the session stays unlocked over an empty vault and
    /// `VaultCorrupted` is returned so the caller can warn the user; the
    /// unreadable data is backed up before anything overwrites it.
    pub fn unlock(&mut self, presented: &str) -> Result<usize> {
        self.guard.unlock(presented)?;

        match self.open_store(presented) {
            Ok(count) => {
                info!(records = count, "vault opened");
                Ok(count)
            }
            Err(e @ CredVaultError::VaultCorrupted(_)) => Err(e),
            Err(e) => {
                self.guard.lock();
                self.store = None;
                Err(e)
            }
        }
    }

    fn open_store(&mut self, presented: &str) -> Result<usize> {
        let name = self.options.slot_name.as_str();
        let existing = self.slots.read(name)?;
        let existing_text = existing
            .as_deref()
            .and_then(|bytes| std::str::from_utf8(bytes).ok());

        let transform = self
            .options
            .cipher
            .transform_for(presented.as_bytes(), name, existing_text)?;
        let mut store = VaultStore::new(self.slots.clone(), name, transform, self.clock.clone())?;
        let loaded = store.load();
        self.store = Some(store);
        loaded
    }

    /// Lock the session and apply the lock policy.
    pub fn lock(&mut self) {
        self.guard.lock();
        self.apply_lock_policy();
    }

    /// Lock if the session has been idle past the configured threshold.
    /// Meant to be called by the host's periodic poll.
    pub fn expire_if_idle(&mut self) -> bool {
        if self.guard.lock_if_expired(self.options.idle_timeout) {
            info!("session locked after inactivity");
            self.apply_lock_policy();
            return true;
        }
        false
    }

    fn apply_lock_policy(&mut self) {
        if self.options.lock_policy == LockPolicy::Evict && self.store.take().is_some() {
            debug!("decrypted vault evicted");
        }
    }

    /// Record user activity (key press, pointer move, command entered).
    pub fn touch(&mut self) {
        self.guard.touch();
    }

    pub fn is_unlocked(&self) -> bool {
        self.guard.is_unlocked()
    }

    pub fn state(&self) -> SessionState {
        self.guard.state()
    }

    pub fn identity(&self) -> Option<String> {
        self.guard.identity()
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.guard.last_activity()
    }

    /// `true` while decrypted records are held in memory.
    pub fn is_resident(&self) -> bool {
        self.store.is_some()
    }

    pub fn options(&self) -> &VaultOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    /// Run `op` against the store if the session is usable, then count
    /// the call as activity.
    fn with_store<T>(&mut self, op: impl FnOnce(&mut VaultStore) -> Result<T>) -> Result<T> {
        self.expire_if_idle();
        if !self.guard.is_unlocked() {
            debug!("vault call rejected: session locked");
            return Err(CredVaultError::SessionLocked);
        }
        let store = self.store.as_mut().ok_or(CredVaultError::SessionLocked)?;
        let out = op(store)?;
        self.guard.touch();
        Ok(out)
    }

    pub fn add(
        &mut self,
        service: &str,
        username: &str,
        secret: &str,
        category: Category,
    ) -> Result<CredentialRecord> {
        self.with_store(|s| s.add(service, username, secret, category))
    }

    /// Returns whether a record was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool> {
        self.with_store(|s| s.remove(id))
    }

    pub fn get(&mut self, id: &str) -> Result<Option<CredentialRecord>> {
        self.with_store(|s| Ok(s.get(id).cloned()))
    }

    /// All records in insertion order.
    pub fn records(&mut self) -> Result<Vec<CredentialRecord>> {
        self.with_store(|s| Ok(s.records().to_vec()))
    }

    pub fn by_category(&mut self, category: Category) -> Result<Vec<CredentialRecord>> {
        self.with_store(|s| Ok(s.by_category(category).into_iter().cloned().collect()))
    }

    pub fn count_by_category(&mut self, category: Category) -> Result<usize> {
        self.with_store(|s| Ok(s.count_by_category(category)))
    }

    pub fn category_counts(&mut self) -> Result<Vec<(Category, usize)>> {
        self.with_store(|s| Ok(s.category_counts()))
    }

    pub fn len(&mut self) -> Result<usize> {
        self.with_store(|s| Ok(s.len()))
    }

    /// Write the current collection even without a mutation.  Used to
    /// create the slot for a new vault.
    pub fn persist(&mut self) -> Result<()> {
        self.with_store(|s| s.persist())
    }
}
