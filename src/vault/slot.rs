//! Persistence slots: named key/value cells holding opaque vault data.
//!
//! `FileSlotStore` keeps one file per slot (`<dir>/<name>.slot`) and
//! writes atomically; `MemorySlotStore` is for tests and embedding.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::errors::{CredVaultError, Result};

/// Longest accepted slot name.
const MAX_SLOT_NAME_LEN: usize = 128;

/// A named key/value byte store.
pub trait SlotStore: Send + Sync {
    /// Read a slot.  A slot that was never written is `Ok(None)`.
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Replace the whole value of a slot.
    fn write(&self, name: &str, value: &[u8]) -> Result<()>;

    /// Remove a slot.  Removing a missing slot is not an error.
    fn remove(&self, name: &str) -> Result<()>;
}

/// Validate that a slot name is safe to use as a file stem.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty, not start with a period, and at most 128 characters.
pub fn validate_slot_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_SLOT_NAME_LEN
        && !name.starts_with('.')
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.');
    if valid {
        Ok(())
    } else {
        Err(CredVaultError::InvalidSlotName(name.to_string()))
    }
}

/// Slots stored as files in a single directory.
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Use `dir` for slot files.  The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file backing `name`.
    pub fn slot_path(&self, name: &str) -> Result<PathBuf> {
        validate_slot_name(name)?;
        Ok(self.dir.join(format!("{name}.slot")))
    }
}

impl SlotStore for FileSlotStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.slot_path(name)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write atomically: temp file in the same directory, then rename,
    /// so readers never see a half-written slot.
    fn write(&self, name: &str, value: &[u8]) -> Result<()> {
        let path = self.slot_path(name)?;
        fs::create_dir_all(&self.dir)?;

        let tmp_path = self.dir.join(format!(".{name}.slot.tmp"));
        fs::write(&tmp_path, value)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.slot_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Slots held in process memory.
#[derive(Debug, Default)]
pub struct MemorySlotStore {
    cells: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemorySlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots currently holding a value.
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of all slots holding a value, sorted.
    pub fn names(&self) -> Vec<String> {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = cells.keys().cloned().collect();
        names.sort();
        names
    }
}

impl SlotStore for MemorySlotStore {
    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        validate_slot_name(name)?;
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(cells.get(name).cloned())
    }

    fn write(&self, name: &str, value: &[u8]) -> Result<()> {
        validate_slot_name(name)?;
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.insert(name.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        validate_slot_name(name)?;
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells.remove(name);
        Ok(())
    }
}
