//! Data models for lostboard.
//!
//! This module contains the item record, form drafts and small value types
//! shared by storage, rendering and services.

mod draft;
mod image;
mod item;
mod theme;

pub use draft::{Draft, DraftForm, FormField};
pub use image::{EncodedImage, MAX_IMAGE_BYTES, check_image_size};
pub use item::{Item, ItemId, ItemStatus, parse_timestamp, timestamp_from_millis};
pub use theme::Theme;
