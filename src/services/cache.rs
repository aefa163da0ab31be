//! In-memory item cache.
//!
//! Holds the last list the backend confirmed, in canonical (oldest-first)
//! order. Every update either fully succeeds or leaves the cache unchanged.

use std::collections::HashSet;

use crate::models::{Item, ItemId};
use crate::{Error, Result};

/// Ordered, id-unique list of items.
#[derive(Debug, Clone, Default)]
pub struct ItemCache {
    items: Vec<Item>,
}

impl ItemCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Replaces the whole contents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `items` repeats an id. The cache
    /// is left untouched in that case.
    pub fn replace(&mut self, items: Vec<Item>) -> Result<()> {
        let mut seen = HashSet::with_capacity(items.len());
        if let Some(dup) = items.iter().find(|item| !seen.insert(&item.id)) {
            return Err(Error::InvalidInput(format!(
                "item list contains duplicate id {}",
                dup.id
            )));
        }
        self.items = items;
        Ok(())
    }

    /// Appends a newly created item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if an item with the same id is cached.
    pub fn push(&mut self, item: Item) -> Result<()> {
        if self.get(&item.id).is_some() {
            return Err(Error::InvalidInput(format!(
                "item {} is already cached",
                item.id
            )));
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes the item with `id`, returning it if it was cached.
    pub fn remove(&mut self, id: &ItemId) -> Option<Item> {
        let pos = self.items.iter().position(|item| &item.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns all items, oldest first.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Returns the number of cached items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the items matching `term`, in stored order.
    ///
    /// Matching is a case-insensitive substring test on name, description,
    /// location and contact. An empty term returns every item.
    #[must_use]
    pub fn filter(&self, term: &str) -> Vec<&Item> {
        let term = term.to_lowercase();
        self.items.iter().filter(|item| item.matches(&term)).collect()
    }
}
