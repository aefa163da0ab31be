//! Display rendering.
//!
//! Provides HTML escaping for untrusted text and the item gallery, which
//! projects an item list into display cards.

mod board;
mod sanitize;

pub use board::{
    Card, CardImage, EMPTY_MESSAGE, Gallery, LOAD_FAILED_MESSAGE, PLACEHOLDER_TEXT,
    format_display_date,
};
pub use sanitize::escape_html;
