//! Locked/unlocked state machine with idle tracking.
//!
//! The guard owns no timer.  Whoever hosts it polls `is_expired` and
//! calls `lock` when it returns `true`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::errors::{CredVaultError, Result};

use super::auth::AuthBackend;
use super::clock::Clock;

/// Authentication state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Locked,
    Unlocked,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Locked => f.write_str("locked"),
            SessionState::Unlocked => f.write_str("unlocked"),
        }
    }
}

/// Gate in front of the vault.  Starts locked.
pub struct SessionGuard {
    backend: Box<dyn AuthBackend>,
    clock: Arc<dyn Clock>,
    state: SessionState,
    /// Set only while unlocked.
    last_activity: Option<DateTime<Utc>>,
}

impl SessionGuard {
    pub fn new(backend: Box<dyn AuthBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            clock,
            state: SessionState::Locked,
            last_activity: None,
        }
    }

    /// Check `presented` with the auth backend and unlock on a match.
    ///
    /// A wrong credential returns `AuthenticationFailed` and leaves the
    /// state exactly as it was.
    pub fn unlock(&mut self, presented: &str) -> Result<()> {
        if !self.backend.verify_credential(presented)? {
            warn!("unlock rejected: wrong master credential");
            return Err(CredVaultError::AuthenticationFailed);
        }

        self.state = SessionState::Unlocked;
        self.last_activity = Some(self.clock.now());
        info!("session unlocked");
        Ok(())
    }

    /// Lock unconditionally.  Safe to call when already locked.
    pub fn lock(&mut self) {
        if self.state == SessionState::Unlocked {
            info!("session locked");
        }
        self.state = SessionState::Locked;
        self.last_activity = None;
    }

    /// Record user activity.  Does nothing while locked.
    pub fn touch(&mut self) {
        if self.state == SessionState::Unlocked {
            self.last_activity = Some(self.clock.now());
        }
    }

    /// `true` when unlocked and more than `idle` has passed since the last
    /// activity.  Exactly `idle` is not yet expired.
    pub fn is_expired(&self, now: DateTime<Utc>, idle: Duration) -> bool {
        match (self.state, self.last_activity) {
            (SessionState::Unlocked, Some(last)) => now - last > idle,
            _ => false,
        }
    }

    /// Lock if idle for longer than `idle`.  Returns whether it locked.
    pub fn lock_if_expired(&mut self, idle: Duration) -> bool {
        if self.is_expired(self.clock.now(), idle) {
            debug!(idle_secs = idle.num_seconds(), "idle threshold exceeded");
            self.lock();
            return true;
        }
        false
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state == SessionState::Unlocked
    }

    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_activity
    }

    /// The backend's signed-in identity, only while unlocked.
    pub fn identity(&self) -> Option<String> {
        if self.is_unlocked() {
            self.backend.current_identity()
        } else {
            None
        }
    }
}
