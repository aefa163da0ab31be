//! # Lostboard
//!
//! A lost-and-found item board.
//!
//! Users report items they lost or found (name, description, location, status,
//! contact, optional photo) and browse, search and delete existing reports.
//! The library keeps an in-memory item list consistent with a persistence
//! backend and renders it deterministically.
//!
//! ## Layers
//!
//! - **Storage**: the [`ItemStore`] trait with a remote HTTP backend and a
//!   local key-value file backend
//! - **Services**: the item cache, image encoder and the interaction controller
//! - **Rendering**: HTML escaping and the item gallery
//! - **Server**: the report API that the remote backend talks to
//!
//! ## Example
//!
//! ```rust,ignore
//! use lostboard::{Controller, DraftForm, LocalStore};
//!
//! let mut controller = Controller::new(LocalStore::open(data_dir)?);
//! controller.load().await?;
//! controller.open_report();
//! controller.fill(DraftForm {
//!     name: "Wallet".to_string(),
//!     description: "Brown leather".to_string(),
//!     location: "Library".to_string(),
//!     status: "lost".to_string(),
//!     contact: "555-0100".to_string(),
//!     image: None,
//! });
//! controller.submit().await?;
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod models;
pub mod observability;
pub mod rendering;
pub mod server;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::{BackendKind, LostboardConfig};
pub use models::{Draft, DraftForm, EncodedImage, FormField, Item, ItemId, ItemStatus, Theme};
pub use rendering::{Card, Gallery, escape_html};
pub use services::{Controller, DeleteOutcome, ImageEncoder, ItemCache, Notice, NoticeLevel};
pub use storage::{Backend, ItemStore, KeyValueStore, LocalStore, RemoteStore, SyncMode};

/// Error type for lostboard operations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `Validation` | A required form field is empty after trimming |
/// | `PayloadTooLarge` | An attached image exceeds the size ceiling |
/// | `EncodingFailed` | An attached image cannot be read |
/// | `FetchFailed` | Listing items from the backend fails |
/// | `SubmitFailed` | Creating an item in the backend fails |
/// | `DeleteFailed` | Deleting an item from the backend fails |
/// | `InvalidInput` | Malformed configuration values, ids or option strings |
/// | `OperationFailed` | Config, key-value file, database or server I/O fails |
///
/// None of these are fatal: the controller turns each into a user-visible
/// notice and leaves the cache in its last known good state.
#[derive(Debug, ThisError)]
pub enum Error {
    /// A required form field is missing.
    ///
    /// Raised before any I/O happens, so the backend never sees the draft.
    #[error("{message}")]
    Validation {
        /// The first field that failed validation.
        field: FormField,
        /// User-facing message for the field.
        message: String,
    },

    /// An attached image is larger than the allowed ceiling.
    #[error("image is too large: {size} bytes (limit {limit} bytes)")]
    PayloadTooLarge {
        /// Size of the rejected payload in bytes.
        size: u64,
        /// The configured ceiling in bytes.
        limit: u64,
    },

    /// An attached image could not be read or encoded.
    #[error("failed to encode image: {0}")]
    EncodingFailed(String),

    /// Fetching the canonical item list failed.
    #[error("failed to load reports: {0}")]
    FetchFailed(String),

    /// Submitting a new item failed.
    ///
    /// Carries the backend's message when one was returned.
    #[error("failed to create report: {0}")]
    SubmitFailed(String),

    /// Deleting an item failed.
    #[error("failed to delete report: {0}")]
    DeleteFailed(String),

    /// Invalid input was provided.
    ///
    /// Raised when:
    /// - A configuration value cannot be parsed (backend kind, theme, URL)
    /// - A list contains duplicate item ids
    /// - A submit is attempted while another one is in flight
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    ///
    /// Raised when:
    /// - The key-value file cannot be read, parsed or written
    /// - `SQLite` operations in the report server fail
    /// - The config file cannot be read or parsed
    /// - The server cannot bind its listener
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns true for failures of the persistence backend.
    #[must_use]
    pub const fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed(_) | Self::SubmitFailed(_) | Self::DeleteFailed(_)
        )
    }
}

/// Result type alias for lostboard operations.
pub type Result<T> = std::result::Result<T, Error>;
