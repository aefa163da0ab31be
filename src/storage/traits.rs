//! Item store trait.

use std::future::Future;

use crate::Result;
use crate::models::{Draft, Item, ItemId};

/// How the controller brings its cache up to date after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Fetch the canonical list again after every create or delete.
    Refetch,
    /// The returned item, or the confirmed removal, is authoritative.
    Direct,
}

/// Trait for item persistence backends.
///
/// Backends are the authoritative source of truth for items. Every method
/// may suspend on network or disk I/O.
pub trait ItemStore: Send + Sync {
    /// Fetches the canonical item list, oldest first.
    ///
    /// Fails with [`crate::Error::FetchFailed`].
    fn list(&self) -> impl Future<Output = Result<Vec<Item>>> + Send;

    /// Persists a new item and returns it as stored.
    ///
    /// The returned id is whatever the backend assigned. Fails with
    /// [`crate::Error::SubmitFailed`], or [`crate::Error::PayloadTooLarge`]
    /// before any write when the draft's image is over the ceiling.
    fn create(&self, draft: &Draft) -> impl Future<Output = Result<Item>> + Send;

    /// Deletes an item by ID.
    ///
    /// Returns `Ok(false)` when no item with that id exists, which callers
    /// treat as equivalent to success. Fails with
    /// [`crate::Error::DeleteFailed`].
    fn delete(&self, id: &ItemId) -> impl Future<Output = Result<bool>> + Send;

    /// Returns how callers should refresh after a mutation.
    fn sync_mode(&self) -> SyncMode {
        SyncMode::Refetch
    }
}
