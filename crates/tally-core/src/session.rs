//! Orchestration of the item store and its persisted mirror.
//!
//! [`Session`] owns exactly one [`ItemStore`] and one [`PersistenceAdapter`].
//! Every mutation runs as: validate input, mutate the store, apply the same
//! logical change to the persisted slot, then report the fresh total. A crash
//! between the two steps leaves at most the in-memory half applied; no
//! committed store change skips its persistence call.

use crate::error::ErrorCode;
use crate::model::{Item, ItemId};
use crate::persist::{KeyValueStore, PersistError, PersistenceAdapter};
use crate::store::{ItemStore, StoreError};

/// Which form field was left blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Value,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Value => f.write_str("value"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{}: {field} must not be empty", ErrorCode::EmptyInput.code())]
    EmptyInput { field: Field },

    #[error("{}: no item with id {id}", ErrorCode::ItemNotFound.code())]
    ItemNotFound { id: ItemId },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl SessionError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyInput { .. } => ErrorCode::EmptyInput,
            Self::ItemNotFound { .. } => ErrorCode::ItemNotFound,
            Self::Store(err) => err.code(),
            Self::Persist(err) => err.code(),
        }
    }

    /// Optional remediation hint for the presentation layer.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// Outcome of a mutation, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// The item added, updated or removed; `None` for no-ops and clears.
    pub item: Option<Item>,
    /// Total after the mutation.
    pub total: i64,
}

#[derive(Debug)]
pub struct Session<S> {
    store: ItemStore,
    persistence: PersistenceAdapter<S>,
}

impl<S: KeyValueStore> Session<S> {
    /// Load the persisted snapshot and start a session over it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if the slot cannot be read or is
    /// corrupt. A corrupt slot is never treated as empty.
    pub fn open(persistence: PersistenceAdapter<S>) -> Result<Self, SessionError> {
        let snapshot = persistence.load()?;
        tracing::info!(
            key = persistence.key(),
            count = snapshot.len(),
            "opened item session"
        );
        Ok(Self {
            store: ItemStore::from_snapshot(snapshot),
            persistence,
        })
    }

    #[must_use]
    pub fn items(&self) -> &[Item] {
        self.store.items()
    }

    #[must_use]
    pub fn total(&self) -> i64 {
        self.store.total_value()
    }

    /// The item being edited, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Item> {
        self.store.selected()
    }

    #[must_use]
    pub const fn store(&self) -> &ItemStore {
        &self.store
    }

    #[must_use]
    pub const fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    pub fn into_parts(self) -> (ItemStore, PersistenceAdapter<S>) {
        (self.store, self.persistence)
    }

    fn change(&self, item: Option<Item>) -> Change {
        Change {
            item,
            total: self.store.total_value(),
        }
    }

    /// Add an item from form text and append it to the persisted slot.
    ///
    /// # Errors
    ///
    /// Empty input, a non-numeric value, exhausted ids, or a persistence
    /// failure.
    pub fn add(&mut self, name: &str, raw_value: &str) -> Result<Change, SessionError> {
        validate(name, raw_value)?;
        let item = self.store.add(name, raw_value)?.clone();
        self.persistence.append(&item)?;
        Ok(self.change(Some(item)))
    }

    /// Enter edit state for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::ItemNotFound`] if no live item has `id`; the
    /// current selection is left as it was.
    pub fn begin_edit(&mut self, id: ItemId) -> Result<&Item, SessionError> {
        if self.store.find_by_id(id).is_none() {
            return Err(SessionError::ItemNotFound { id });
        }
        self.store.set_selected(Some(id));
        self.store
            .selected()
            .ok_or(SessionError::ItemNotFound { id })
    }

    /// Leave edit state without changing anything.
    pub fn cancel_edit(&mut self) {
        self.store.set_selected(None);
    }

    /// Apply form text to the selected item, persist it, and leave edit state.
    ///
    /// # Errors
    ///
    /// Empty input, no (or a stale) selection, a non-numeric value, or a
    /// persistence failure. On any store error the selection is kept so the
    /// edit form stays in sync.
    pub fn update(&mut self, name: &str, raw_value: &str) -> Result<Change, SessionError> {
        validate(name, raw_value)?;
        let item = self.store.update(name, raw_value)?.clone();
        self.persistence.upsert(&item)?;
        self.store.set_selected(None);
        Ok(self.change(Some(item)))
    }

    /// Delete the item currently being edited.
    ///
    /// # Errors
    ///
    /// [`StoreError::NoSelection`] / [`StoreError::StaleSelection`] when there
    /// is nothing live to delete, or a persistence failure.
    pub fn delete_selected(&mut self) -> Result<Change, SessionError> {
        let id = self.store.selected_id().ok_or(StoreError::NoSelection)?;
        if self.store.selected().is_none() {
            self.store.set_selected(None);
            return Err(StoreError::StaleSelection { id }.into());
        }
        self.remove(id)
    }

    /// Remove `id` from the store and the persisted slot. Unknown ids are a
    /// no-op on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if the slot cannot be rewritten.
    pub fn remove(&mut self, id: ItemId) -> Result<Change, SessionError> {
        let removed = self.store.remove(id);
        if removed.is_some() {
            self.persistence.remove(id)?;
        }
        Ok(self.change(removed))
    }

    /// Empty the store and delete the persisted slot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Persist`] if the slot cannot be deleted.
    pub fn clear_all(&mut self) -> Result<Change, SessionError> {
        self.store.clear_all();
        self.persistence.clear()?;
        Ok(self.change(None))
    }
}

fn validate(name: &str, raw_value: &str) -> Result<(), SessionError> {
    if name.trim().is_empty() {
        return Err(SessionError::EmptyInput { field: Field::Name });
    }
    if raw_value.trim().is_empty() {
        return Err(SessionError::EmptyInput {
            field: Field::Value,
        });
    }
    Ok(())
}
