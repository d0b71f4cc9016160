//! Durable mirror of the item collection.
//!
//! The whole collection lives in one slot of a string key-value substrate as a
//! JSON array. Every write replaces the slot wholesale; there are no partial
//! or delta writes. An absent slot reads as an empty collection.
//!
//! `append`, `upsert` and `remove` are read-modify-write over the whole
//! snapshot. They are not atomic across writers: two interleaved callers can
//! lose an update. Only one actor is expected to drive a slot at a time.

pub mod file;
pub mod memory;
pub mod sqlite;

use std::path::Path;

use crate::error::ErrorCode;
use crate::model::{Item, ItemId};

pub use file::FileStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

/// Slot key used when none is configured.
pub const DEFAULT_KEY: &str = "items";

/// Failures raised by a storage substrate.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{}: storage I/O failed at {path}: {source}", ErrorCode::StorageIo.code())]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: sqlite storage failed: {}", ErrorCode::StorageSqlite.code(), .0)]
    Sqlite(#[from] rusqlite::Error),

    #[error("{}: storage key {key:?} must be non-empty and use only [A-Za-z0-9_-]", ErrorCode::InvalidStorageKey.code())]
    InvalidKey { key: String },
}

impl BackendError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::StorageIo,
            Self::Sqlite(_) => ErrorCode::StorageSqlite,
            Self::InvalidKey { .. } => ErrorCode::InvalidStorageKey,
        }
    }
}

/// Errors returned by [`PersistenceAdapter`].
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The slot holds text that is not a valid item snapshot. Nothing was
    /// recovered and nothing was overwritten.
    #[error("{}: slot {key:?} does not hold a valid item snapshot: {source}", ErrorCode::CorruptSnapshot.code())]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: failed to encode item snapshot: {}", ErrorCode::InternalEncode.code(), .0)]
    Encode(#[source] serde_json::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl PersistError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Corrupt { .. } => ErrorCode::CorruptSnapshot,
            Self::Encode(_) => ErrorCode::InternalEncode,
            Self::Backend(err) => err.code(),
        }
    }
}

/// A synchronous string key-value substrate (browser local storage or an
/// equivalent). Removing an absent key succeeds.
pub trait KeyValueStore {
    /// Read the value stored under `key`, or `None` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the substrate cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the substrate cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError>;

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the substrate cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;
}

/// Any of the built-in substrates, selected at runtime from configuration.
#[derive(Debug)]
pub enum Backend {
    Memory(MemoryStorage),
    File(FileStorage),
    Sqlite(SqliteStorage),
}

impl KeyValueStore for Backend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match self {
            Self::Memory(s) => s.get(key),
            Self::File(s) => s.get(key),
            Self::Sqlite(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        match self {
            Self::Memory(s) => s.set(key, value),
            Self::File(s) => s.set(key, value),
            Self::Sqlite(s) => s.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        match self {
            Self::Memory(s) => s.remove(key),
            Self::File(s) => s.remove(key),
            Self::Sqlite(s) => s.remove(key),
        }
    }
}

/// Keeps one storage slot in lockstep with the item collection.
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    /// Adapter over `storage` using [`DEFAULT_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Read the full snapshot. An absent slot is an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Corrupt`] if the slot holds malformed content,
    /// or [`PersistError::Backend`] if the substrate read fails.
    pub fn load(&self) -> Result<Vec<Item>, PersistError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|source| {
            tracing::warn!(key = %self.key, error = %source, "stored item snapshot is corrupt");
            PersistError::Corrupt {
                key: self.key.clone(),
                source,
            }
        })
    }

    /// Overwrite the slot with `items`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if encoding or the substrate write fails.
    pub fn save_all(&mut self, items: &[Item]) -> Result<(), PersistError> {
        let raw = serde_json::to_string(items).map_err(PersistError::Encode)?;
        self.storage.set(&self.key, &raw)?;
        tracing::debug!(key = %self.key, count = items.len(), "wrote item snapshot");
        Ok(())
    }

    /// Push `item` to the end of the stored snapshot.
    ///
    /// # Errors
    ///
    /// Fails like [`load`](Self::load) and [`save_all`](Self::save_all); a
    /// corrupt slot is left untouched.
    pub fn append(&mut self, item: &Item) -> Result<(), PersistError> {
        let mut items = self.load()?;
        items.push(item.clone());
        self.save_all(&items)
    }

    /// Replace the stored entry with `item.id`, or append it if absent.
    ///
    /// # Errors
    ///
    /// Fails like [`load`](Self::load) and [`save_all`](Self::save_all); a
    /// corrupt slot is left untouched.
    pub fn upsert(&mut self, item: &Item) -> Result<(), PersistError> {
        let mut items = self.load()?;
        match items.iter_mut().find(|stored| stored.id == item.id) {
            Some(stored) => *stored = item.clone(),
            None => {
                tracing::debug!(id = %item.id, "upsert target missing from snapshot; appending");
                items.push(item.clone());
            }
        }
        self.save_all(&items)
    }

    /// Drop the stored entry with `id`. Unknown ids leave the slot as is.
    ///
    /// # Errors
    ///
    /// Fails like [`load`](Self::load) and [`save_all`](Self::save_all).
    pub fn remove(&mut self, id: ItemId) -> Result<(), PersistError> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|stored| stored.id != id);
        if items.len() == before {
            return Ok(());
        }
        self.save_all(&items)
    }

    /// Delete the slot entirely; the next [`load`](Self::load) sees it as absent.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::Backend`] if the substrate write fails.
    pub fn clear(&mut self) -> Result<(), PersistError> {
        self.storage.remove(&self.key)?;
        tracing::debug!(key = %self.key, "cleared item snapshot");
        Ok(())
    }
}
