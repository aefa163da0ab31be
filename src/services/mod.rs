//! Business logic services.
//!
//! Services sit between the user-facing front ends and the storage layer:
//! the item cache, photo encoding, the theme preference and the
//! [`Controller`] that ties them together.

mod cache;
mod controller;
mod image;
mod theme;

pub use cache::ItemCache;
pub use controller::{
    ALREADY_REMOVED_MESSAGE, Controller, DELETE_PROMPT, DELETE_SUCCESS_MESSAGE, DeleteOutcome,
    Focus, Notice, NoticeLevel, REPORT_SUCCESS_MESSAGE, ReportSurface,
};
pub use image::ImageEncoder;
pub use theme::{THEME_KEY, ThemePreference};
