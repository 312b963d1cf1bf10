//! Vault activity history in `<vault_dir>/audit.db` (SQLite).
//!
//! One row per session event: unlock, lock, auto-lock, add, remove, get,
//! copy.  Rows name the slot and at most a record id plus a short detail
//! such as a category.  Credential values are never passed in.
//!
//! Logging is best effort.  A database that cannot be opened or written
//! leaves the vault operation unaffected.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::errors::{CredVaultError, Result};

const DB_FILE: &str = "audit.db";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS events (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    at_ms      INTEGER NOT NULL,
    operation  TEXT NOT NULL,
    slot       TEXT NOT NULL,
    record_id  TEXT,
    details    TEXT
);";

/// One event to append.
#[derive(Debug, Clone, Copy)]
pub struct AuditEvent<'a> {
    pub operation: &'a str,
    pub slot: &'a str,
    pub record_id: Option<&'a str>,
    pub details: Option<&'a str>,
}

/// One event read back, as shown by `credvault audit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub slot: String,
    pub record_id: Option<String>,
    pub details: Option<String>,
}

impl AuditEntry {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let at_ms: i64 = row.get(0)?;
        Ok(Self {
            timestamp: DateTime::from_timestamp_millis(at_ms).unwrap_or_default(),
            operation: row.get(1)?,
            slot: row.get(2)?,
            record_id: row.get(3)?,
            details: row.get(4)?,
        })
    }
}

pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open or create the database in `vault_dir`.  `None` means audit
    /// logging is unavailable.
    pub fn open(vault_dir: &Path) -> Option<Self> {
        let path = vault_dir.join(DB_FILE);
        let conn = Connection::open(&path).ok()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
        }

        conn.execute_batch(SCHEMA).ok()?;
        Some(Self { conn })
    }

    /// Append `event` stamped with the current time.  Errors are ignored.
    pub fn record(&self, event: AuditEvent<'_>) {
        let _ = self.conn.execute(
            "INSERT INTO events (at_ms, operation, slot, record_id, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Utc::now().timestamp_millis(),
                event.operation,
                event.slot,
                event.record_id,
                event.details
            ],
        );
    }

    /// Up to `limit` events, newest first, optionally only those at or
    /// after `since`.
    pub fn recent(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let failed = |e: rusqlite::Error| CredVaultError::AuditError(e.to_string());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT at_ms, operation, slot, record_id, details FROM events
                 WHERE at_ms >= ?1 ORDER BY seq DESC LIMIT ?2",
            )
            .map_err(failed)?;

        let since_ms = since.map_or(i64::MIN, |t| t.timestamp_millis());
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let entries = stmt
            .query_map(params![since_ms, limit], AuditEntry::from_row)
            .map_err(failed)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(failed)?;
        Ok(entries)
    }
}

/// Log one event to the database in `vault_dir`, ignoring any failure.
pub fn log_audit(vault_dir: &Path, event: AuditEvent<'_>) {
    if let Some(audit) = AuditLog::open(vault_dir) {
        audit.record(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn event<'a>(operation: &'a str, record_id: Option<&'a str>) -> AuditEvent<'a> {
        AuditEvent {
            operation,
            slot: "passwords",
            record_id,
            details: None,
        }
    }

    #[test]
    fn open_creates_database() {
        let dir = TempDir::new().unwrap();
        assert!(AuditLog::open(dir.path()).is_some());
        assert!(dir.path().join(DB_FILE).exists());
    }

    #[test]
    fn events_come_back_newest_first() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();

        audit.record(event("unlock", None));
        audit.record(AuditEvent {
            details: Some("work"),
            ..event("add", Some("id-1"))
        });
        audit.record(event("remove", Some("id-1")));

        let ops: Vec<_> = audit
            .recent(10, None)
            .unwrap()
            .into_iter()
            .map(|e| e.operation)
            .collect();
        assert_eq!(ops, ["remove", "add", "unlock"]);

        let add = &audit.recent(2, None).unwrap()[1];
        assert_eq!(add.record_id.as_deref(), Some("id-1"));
        assert_eq!(add.details.as_deref(), Some("work"));
    }

    #[test]
    fn limit_and_since_filter() {
        let dir = TempDir::new().unwrap();
        let audit = AuditLog::open(dir.path()).unwrap();
        for _ in 0..5 {
            audit.record(event("get", Some("id")));
        }

        assert_eq!(audit.recent(3, None).unwrap().len(), 3);

        let hour = chrono::Duration::hours(1);
        assert_eq!(audit.recent(10, Some(Utc::now() - hour)).unwrap().len(), 5);
        assert!(audit.recent(10, Some(Utc::now() + hour)).unwrap().is_empty());
    }

    #[test]
    fn helper_writes_slot_name() {
        let dir = TempDir::new().unwrap();
        log_audit(
            dir.path(),
            AuditEvent {
                slot: "personal",
                details: Some("idle"),
                ..event("auto-lock", None)
            },
        );

        let entries = AuditLog::open(dir.path()).unwrap().recent(1, None).unwrap();
        assert_eq!(entries[0].slot, "personal");
        assert_eq!(entries[0].operation, "auto-lock");
    }

    #[test]
    fn unopenable_path_disables_logging() {
        assert!(AuditLog::open(Path::new("/nonexistent/credvault/dir")).is_none());
        log_audit(Path::new("/nonexistent/credvault/dir"), event("lock", None));
    }

    #[cfg(unix)]
    #[test]
    fn database_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let _audit = AuditLog::open(dir.path()).unwrap();
        let mode = std::fs::metadata(dir.path().join(DB_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
