//! Storage layer abstraction.
//!
//! Two interchangeable item backends sit behind [`ItemStore`]:
//! - **Remote**: the report HTTP API, refetched after every mutation
//! - **Local**: a JSON key-value file, updated in place
//!
//! [`Backend`] picks one at runtime from configuration.

// Allow significant_drop_tightening - the kv file is read and written under one await chain.
#![allow(clippy::significant_drop_tightening)]

pub mod kv;
pub mod local;
pub mod remote;
pub mod traits;

pub use kv::KeyValueStore;
pub use local::{ITEMS_KEY, LocalStore};
pub use remote::RemoteStore;
pub use traits::{ItemStore, SyncMode};

use crate::config::{BackendKind, LostboardConfig};
use crate::models::{Draft, Item, ItemId};
use crate::Result;

/// Backend selected at runtime.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Report HTTP API.
    Remote(RemoteStore),
    /// Local key-value file.
    Local(LocalStore),
}

impl Backend {
    /// Builds the backend named by the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is invalid or the data directory
    /// cannot be created.
    pub fn from_config(config: &LostboardConfig) -> Result<Self> {
        match config.backend {
            BackendKind::Remote => {
                tracing::debug!(api_base = %config.api_base, "Using remote backend");
                Ok(Self::Remote(RemoteStore::with_timeout(
                    &config.api_base,
                    config.request_timeout,
                )?))
            },
            BackendKind::Local => {
                tracing::debug!(data_dir = %config.data_dir.display(), "Using local backend");
                Ok(Self::Local(LocalStore::open(&config.data_dir)?))
            },
        }
    }

    /// Returns which kind of backend this is.
    #[must_use]
    pub const fn kind(&self) -> BackendKind {
        match self {
            Self::Remote(_) => BackendKind::Remote,
            Self::Local(_) => BackendKind::Local,
        }
    }
}

impl ItemStore for Backend {
    async fn list(&self) -> Result<Vec<Item>> {
        match self {
            Self::Remote(store) => store.list().await,
            Self::Local(store) => store.list().await,
        }
    }

    async fn create(&self, draft: &Draft) -> Result<Item> {
        match self {
            Self::Remote(store) => store.create(draft).await,
            Self::Local(store) => store.create(draft).await,
        }
    }

    async fn delete(&self, id: &ItemId) -> Result<bool> {
        match self {
            Self::Remote(store) => store.delete(id).await,
            Self::Local(store) => store.delete(id).await,
        }
    }

    fn sync_mode(&self) -> SyncMode {
        match self {
            Self::Remote(store) => store.sync_mode(),
            Self::Local(store) => store.sync_mode(),
        }
    }
}
