//! Session lifecycle: who may use the vault, and for how long.
//!
//! This module provides:
//! - The `AuthBackend` seam with static and hashed-secret variants (`auth`)
//! - Injectable time sources (`clock`)
//! - `SessionGuard`, the locked/unlocked state machine (`guard`)

pub mod auth;
pub mod clock;
pub mod guard;

pub use auth::{AuthBackend, HashedSecretAuth, StaticSecretAuth};
pub use clock::{Clock, ManualClock, SystemClock};
pub use guard::{SessionGuard, SessionState};
