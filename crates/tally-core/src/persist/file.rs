//! Directory-backed substrate: one `<key>.json` file per slot.
//!
//! Writes go to a temp file in the same directory and are renamed into place,
//! so a crash mid-write leaves either the old snapshot or the new one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::{BackendError, KeyValueStore};

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` as the storage root, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, BackendError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| BackendError::io(&dir, e))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidKey`] unless `key` is non-empty and made
    /// of ASCII letters, digits, `-` and `_`.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, BackendError> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(BackendError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::io(&path, e)),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        let path = self.slot_path(key)?;
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| BackendError::io(&self.dir, e))?;
        tmp.write_all(value.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| BackendError::io(tmp.path(), e))?;
        tmp.persist(&path)
            .map_err(|e| BackendError::io(&path, e.error))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::io(&path, e)),
        }
    }
}
