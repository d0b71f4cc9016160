//! Canonical in-memory item collection.
//!
//! [`ItemStore`] is the single source of truth for the live items and the
//! item currently being edited. It never touches persistence; pairing each
//! mutation with a snapshot write is the job of [`crate::session::Session`].
//!
//! The selection is held as an [`ItemId`] key rather than a reference and is
//! resolved against the collection on every read, so a removed item can never
//! be observed through it.

use crate::error::ErrorCode;
use crate::model::{InvalidValue, Item, ItemId, parse_value};

/// Errors returned by [`ItemStore`] mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{}: update requires a selected item", ErrorCode::NoSelection.code())]
    NoSelection,

    #[error("{}: selected item {id} is no longer in the collection", ErrorCode::StaleSelection.code())]
    StaleSelection { id: ItemId },

    #[error("{}: item ids are exhausted; {max} is the largest id", ErrorCode::IdsExhausted.code())]
    IdsExhausted { max: ItemId },

    #[error(transparent)]
    InvalidValue(#[from] InvalidValue),
}

impl StoreError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NoSelection => ErrorCode::NoSelection,
            Self::StaleSelection { .. } => ErrorCode::StaleSelection,
            Self::IdsExhausted { .. } => ErrorCode::IdsExhausted,
            Self::InvalidValue(_) => ErrorCode::InvalidValue,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStore {
    items: Vec<Item>,
    selected: Option<ItemId>,
}

impl ItemStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
        }
    }

    /// Build a store already holding `snapshot`.
    #[must_use]
    pub fn from_snapshot(snapshot: Vec<Item>) -> Self {
        let mut store = Self::new();
        store.initialize(snapshot);
        store
    }

    /// Replace the whole collection with `snapshot` and clear the selection.
    pub fn initialize(&mut self, snapshot: Vec<Item>) {
        tracing::debug!(count = snapshot.len(), "initializing item store");
        self.items = snapshot;
        self.selected = None;
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The id the next [`add`](Self::add) will assign, or `None` once the
    /// largest live id is `u64::MAX`.
    #[must_use]
    pub fn next_id(&self) -> Option<ItemId> {
        match self.items.iter().map(|item| item.id).max() {
            Some(max) => max.next(),
            None => Some(ItemId::FIRST),
        }
    }

    /// Append a new item built from form text.
    ///
    /// Callers are expected to have rejected empty input already.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidValue`] if `raw_value` does not coerce.
    /// - [`StoreError::IdsExhausted`] if the largest live id is `u64::MAX`.
    ///
    /// The collection is unchanged on every error.
    pub fn add(&mut self, name: &str, raw_value: &str) -> Result<&Item, StoreError> {
        let value = parse_value(raw_value)?;
        let Some(id) = self.next_id() else {
            return Err(StoreError::IdsExhausted {
                max: ItemId(u64::MAX),
            });
        };
        tracing::debug!(%id, value, "adding item");
        self.items.push(Item::new(id, name, value));
        Ok(&self.items[self.items.len() - 1])
    }

    #[must_use]
    pub fn find_by_id(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Set or clear the selection. The id is not checked against the collection.
    pub fn set_selected(&mut self, id: Option<ItemId>) {
        self.selected = id;
    }

    /// The selected item, if the selection still names a live item.
    #[must_use]
    pub fn selected(&self) -> Option<&Item> {
        self.selected.and_then(|id| self.find_by_id(id))
    }

    /// The raw selection key, which may be stale.
    #[must_use]
    pub const fn selected_id(&self) -> Option<ItemId> {
        self.selected
    }

    /// Overwrite the selected item's name and value in place.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NoSelection`] when nothing is selected.
    /// - [`StoreError::StaleSelection`] when the selected id is gone.
    /// - [`StoreError::InvalidValue`] when `raw_value` does not coerce.
    ///
    /// The collection is unchanged on every error.
    pub fn update(&mut self, name: &str, raw_value: &str) -> Result<&Item, StoreError> {
        let id = self.selected.ok_or(StoreError::NoSelection)?;
        let Some(index) = self.items.iter().position(|item| item.id == id) else {
            tracing::warn!(%id, "update against stale selection");
            return Err(StoreError::StaleSelection { id });
        };
        let value = parse_value(raw_value)?;

        tracing::debug!(%id, value, "updating item");
        let item = &mut self.items[index];
        item.name = name.to_string();
        item.value = value;
        Ok(item)
    }

    /// Remove the item with `id`, returning it. Unknown ids are a no-op.
    ///
    /// Removing the selected item also clears the selection.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(%id, "removing item");
        Some(self.items.remove(index))
    }

    /// Drop every item and the selection along with them.
    pub fn clear_all(&mut self) {
        tracing::debug!(count = self.items.len(), "clearing item store");
        self.items.clear();
        self.selected = None;
    }

    /// Sum of all item values, recomputed on every call.
    ///
    /// Summed in `i128` and clamped to the `i64` range once at the end, so the
    /// result is exact whenever the true sum fits.
    #[must_use]
    pub fn total_value(&self) -> i64 {
        let sum: i128 = self.items.iter().map(|item| i128::from(item.value)).sum();
        i64::try_from(sum).unwrap_or(if sum > 0 { i64::MAX } else { i64::MIN })
    }
}
