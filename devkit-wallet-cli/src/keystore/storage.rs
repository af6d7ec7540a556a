//! Storage functionality for the keystore module.
//!
//! The keystore lives in a single JSON file at an explicitly configured path.
//! The file is the sole source of truth: the in-memory entry list and active
//! index are a cache that callers must flush with [`KeystoreStore::write`]
//! after every mutation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::{
    KeystoreError, Result,
    models::{self, KeystoreEntry, KeystoreFile},
};

/// Durable storage for the keystore file plus in-memory accessors.
///
/// No cryptography happens here; encrypted secrets pass through as opaque
/// strings.
pub struct KeystoreStore {
    /// Backing file path, resolved once by the surrounding application
    path: PathBuf,

    entries: Vec<KeystoreEntry>,
    active_index: Option<usize>,
}

impl KeystoreStore {
    /// Creates a store over the given path. No I/O happens until
    /// [`KeystoreStore::load`] or [`KeystoreStore::write`] is called.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            active_index: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the keystore file from disk.
    ///
    /// Returns `Ok(None)` when the file is absent or empty. Contents in a
    /// recognized legacy layout are migrated and rewritten canonically on the
    /// spot; anything else that fails to parse is a hard error, never treated
    /// as absent.
    pub fn read(&self) -> Result<Option<KeystoreFile>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<KeystoreFile>(&raw) {
            Ok(file) => {
                if let Some(index) = file.active_index {
                    if index >= file.entries.len() {
                        warn!(index, entries = file.entries.len(),
                            "active index out of range in keystore file");
                    }
                }
                Ok(Some(file))
            }
            Err(parse_err) => match models::from_legacy(&raw) {
                Some(file) => {
                    info!(path = %self.path.display(),
                        "migrating legacy keystore layout to canonical schema");
                    self.write_file(&file)?;
                    Ok(Some(file))
                }
                None => Err(KeystoreError::Serialization(parse_err)),
            },
        }
    }

    /// Populates the in-memory cache from disk. Returns `true` when a
    /// keystore file existed.
    pub fn load(&mut self) -> Result<bool> {
        match self.read()? {
            Some(file) => {
                self.entries = file.entries;
                self.active_index = file.active_index;
                Ok(true)
            }
            None => {
                self.entries.clear();
                self.active_index = None;
                Ok(false)
            }
        }
    }

    /// Persists the in-memory state, overwriting the file wholesale.
    ///
    /// The serialized bytes land in a sibling temp file first and are renamed
    /// into place, so a concurrent reader never observes a partial file.
    pub fn write(&self) -> Result<()> {
        let file = KeystoreFile {
            entries: self.entries.clone(),
            active_index: self.active_index,
        };
        self.write_file(&file)
    }

    fn write_file(&self, file: &KeystoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(file)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json.as_bytes())?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = file.entries.len(),
            "keystore written");
        Ok(())
    }

    pub fn entries(&self) -> &[KeystoreEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<KeystoreEntry>) {
        self.entries = entries;
    }

    /// Appends an entry; the new entry's index is the prior length.
    pub fn push_entry(&mut self, entry: KeystoreEntry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub(crate) fn pop_entry(&mut self) -> Option<KeystoreEntry> {
        self.entries.pop()
    }

    /// Removes the entry at `index`, shifting the active selector so it keeps
    /// pointing at the same entry (or clearing it if that entry was removed).
    /// Callers must bounds-check `index` first.
    pub(crate) fn remove_entry(&mut self, index: usize) -> KeystoreEntry {
        let removed = self.entries.remove(index);
        self.active_index = match self.active_index {
            Some(active) if active == index => None,
            Some(active) if active > index => Some(active - 1),
            other => other,
        };
        removed
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    pub fn set_active_index(&mut self, index: Option<usize>) {
        self.active_index = index;
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
