//! Item gallery rendering.
//!
//! The gallery is a projection of an item list into display cards. Input is
//! in canonical (oldest first) order and is shown newest first. Every render
//! clears the previous output, so rendering the same list twice produces the
//! same cards and the same delete affordances.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::escape_html;
use crate::models::{Item, ItemId, ItemStatus, Theme};

/// Shown when there is nothing to display.
pub const EMPTY_MESSAGE: &str = "No items reported yet.";

/// Shown when the initial load fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load items. Please try again.";

/// Placeholder text for cards without a photo.
pub const PLACEHOLDER_TEXT: &str = "No Image";

/// Formats a timestamp for display, e.g. `Mar 05, 2024, 02:30 PM` (UTC).
#[must_use]
pub fn format_display_date(dt: &DateTime<Utc>) -> String {
    dt.format("%b %d, %Y, %I:%M %p").to_string()
}

/// The photo slot of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardImage {
    /// An attached photo (data URI or URL).
    Photo {
        /// Image source.
        src: String,
        /// Alternative text (the item name).
        alt: String,
    },
    /// No photo attached.
    Placeholder,
}

/// A display card for one item.
///
/// Fields hold the raw text; [`Card::to_html`] escapes every one of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    /// Key of the card's delete affordance.
    pub id: ItemId,
    /// Item name.
    pub name: String,
    /// Item description.
    pub description: String,
    /// Location line; omitted from the markup when empty.
    pub location: String,
    /// Contact line.
    pub contact: String,
    /// Status badge.
    pub status: ItemStatus,
    /// Human-readable creation date.
    pub date: String,
    /// Full creation timestamp (RFC 3339), used as the date tooltip.
    pub date_title: String,
    /// Photo or placeholder.
    pub image: CardImage,
}

impl Card {
    /// Builds the card for an item.
    #[must_use]
    pub fn from_item(item: &Item) -> Self {
        let image = match item.image.as_deref() {
            Some(src) if !src.is_empty() => CardImage::Photo {
                src: src.to_string(),
                alt: item.name.clone(),
            },
            _ => CardImage::Placeholder,
        };

        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            location: item.location.clone(),
            contact: item.contact.clone(),
            status: item.status,
            date: format_display_date(&item.created_at),
            date_title: item.created_at.to_rfc3339(),
            image,
        }
    }

    /// Returns the card markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let id = escape_html(self.id.as_str());
        let image = match &self.image {
            CardImage::Photo { src, alt } => format!(
                r#"<img src="{}" alt="{}">"#,
                escape_html(src),
                escape_html(alt)
            ),
            CardImage::Placeholder => {
                format!(r#"<div class="placeholder-image">{PLACEHOLDER_TEXT}</div>"#)
            },
        };
        let location = if self.location.is_empty() {
            String::new()
        } else {
            format!(
                r#"<p class="location-line"><span class="loc-icon" aria-hidden="true">📍</span>{}</p>"#,
                escape_html(&self.location)
            )
        };
        let status = self.status.as_str();
        let label = status.to_uppercase();

        format!(
            concat!(
                r#"<div class="item-card" data-id="{id}">"#,
                r#"<span class="item-date" title="{date_title}">{date}</span>"#,
                r#"<button class="delete-btn" data-id="{id}" aria-label="Delete item">&times;</button>"#,
                "{image}",
                r#"<div class="item-card-content">"#,
                r#"<span class="status-badge status-{status}">{label}</span>"#,
                "<h3>{name}</h3>",
                "{location}",
                "<p>{description}</p>",
                r#"<p class="contact-line"><strong>Contact:</strong> {contact}</p>"#,
                "</div></div>"
            ),
            id = id,
            date_title = escape_html(&self.date_title),
            date = escape_html(&self.date),
            image = image,
            status = status,
            label = label,
            name = escape_html(&self.name),
            location = location,
            description = escape_html(&self.description),
            contact = escape_html(&self.contact),
        )
    }

    /// Returns a plain-text rendering for terminals.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "[{}] {} (#{})\n  {}\n",
            self.status.as_str().to_uppercase(),
            self.name,
            self.id,
            self.description
        );
        if !self.location.is_empty() {
            let _ = writeln!(out, "  Location: {}", self.location);
        }
        let _ = writeln!(out, "  Contact: {}", self.contact);
        let _ = writeln!(out, "  Reported: {}", self.date);
        let photo = match self.image {
            CardImage::Photo { .. } => "attached",
            CardImage::Placeholder => PLACEHOLDER_TEXT,
        };
        let _ = writeln!(out, "  Photo: {photo}");
        out
    }
}

/// The rendered item list: either cards or an empty-state message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Gallery {
    cards: Vec<Card>,
    empty_message: Option<String>,
}

impl Gallery {
    /// Creates an empty, never-rendered gallery.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the given items newest first, replacing any previous output.
    ///
    /// `items` is in canonical order and is not modified.
    pub fn render(&mut self, items: &[&Item]) {
        self.clear();
        if items.is_empty() {
            self.empty_message = Some(EMPTY_MESSAGE.to_string());
            return;
        }
        self.cards = items.iter().rev().map(|item| Card::from_item(item)).collect();
    }

    /// Shows the empty state with a custom message.
    pub fn render_error(&mut self, message: impl Into<String>) {
        self.clear();
        self.empty_message = Some(message.into());
    }

    fn clear(&mut self) {
        self.cards.clear();
        self.empty_message = None;
    }

    /// Returns the rendered cards, newest first.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Returns the number of rendered cards.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Returns the empty-state message when it is shown.
    #[must_use]
    pub fn empty_message(&self) -> Option<&str> {
        self.empty_message.as_deref()
    }

    /// Returns true if the empty state is shown.
    #[must_use]
    pub const fn is_empty_state(&self) -> bool {
        self.empty_message.is_some()
    }

    /// Returns the ids bound to delete affordances, in display order.
    pub fn delete_affordances(&self) -> impl Iterator<Item = &ItemId> {
        self.cards.iter().map(|card| &card.id)
    }

    /// Returns the gallery markup followed by the empty-state element.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from(r#"<div id="item-gallery">"#);
        for card in &self.cards {
            out.push_str(&card.to_html());
        }
        out.push_str("</div>");

        let (display, message) = self
            .empty_message
            .as_deref()
            .map_or(("none", EMPTY_MESSAGE), |m| ("block", m));
        let _ = write!(
            out,
            r#"<p id="empty-message" style="display: {display}">{}</p>"#,
            escape_html(message)
        );
        out
    }

    /// Returns a complete HTML page for the gallery.
    #[must_use]
    pub fn to_page(&self, theme: Theme) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n",
                "<html lang=\"en\">\n",
                "<head><meta charset=\"utf-8\"><title>Lost &amp; Found</title></head>\n",
                "<body class=\"{class}\">\n",
                "<main>{gallery}</main>\n",
                "</body>\n",
                "</html>\n"
            ),
            class = theme.body_class(),
            gallery = self.to_html(),
        )
    }

    /// Returns a plain-text rendering for terminals.
    #[must_use]
    pub fn to_text(&self) -> String {
        if let Some(message) = &self.empty_message {
            return format!("{message}\n");
        }
        self.cards
            .iter()
            .map(Card::to_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::timestamp_from_millis;
    use chrono::TimeZone;

    fn item(id: &str, name: &str) -> Item {
        Item {
            id: ItemId::new(id),
            name: name.to_string(),
            description: "desc".to_string(),
            location: "Library".to_string(),
            status: ItemStatus::Found,
            contact: "555-0100".to_string(),
            image: None,
            created_at: timestamp_from_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_render_reverses_without_touching_input() {
        let items = [item("1", "Old"), item("2", "New")];
        let view: Vec<&Item> = items.iter().collect();

        let mut gallery = Gallery::new();
        gallery.render(&view);

        let names: Vec<&str> = gallery.cards().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["New", "Old"]);
        assert_eq!(view[0].name, "Old");
        assert!(!gallery.is_empty_state());
    }

    #[test]
    fn test_render_twice_is_idempotent() {
        let items = [item("1", "A"), item("2", "B"), item("3", "C")];
        let view: Vec<&Item> = items.iter().collect();

        let mut gallery = Gallery::new();
        gallery.render(&view);
        let first = gallery.to_html();
        gallery.render(&view);

        assert_eq!(gallery.to_html(), first);
        assert_eq!(gallery.card_count(), items.len());
        assert_eq!(first.matches("class=\"delete-btn\"").count(), items.len());
        let ids: Vec<&str> = gallery.delete_affordances().map(ItemId::as_str).collect();
        assert_eq!(ids, ["3", "2", "1"]);
    }

    #[test]
    fn test_empty_list_shows_empty_state() {
        let mut gallery = Gallery::new();
        gallery.render(&[item("1", "A")].iter().collect::<Vec<_>>());
        gallery.render(&[]);

        assert_eq!(gallery.card_count(), 0);
        assert_eq!(gallery.empty_message(), Some(EMPTY_MESSAGE));
        assert!(gallery.to_html().contains("display: block"));
        assert_eq!(gallery.to_text(), format!("{EMPTY_MESSAGE}\n"));
    }

    #[test]
    fn test_render_error_replaces_cards() {
        let mut gallery = Gallery::new();
        gallery.render(&[item("1", "A")].iter().collect::<Vec<_>>());
        gallery.render_error(LOAD_FAILED_MESSAGE);

        assert_eq!(gallery.card_count(), 0);
        assert_eq!(gallery.empty_message(), Some(LOAD_FAILED_MESSAGE));
    }

    #[test]
    fn test_card_markup_is_escaped() {
        let mut hostile = item("7\"><script>", "<script>alert('x')</script>");
        hostile.description = "a & b".to_string();
        hostile.image = Some("javascript:\"boom\"".to_string());

        let html = Card::from_item(&hostile).to_html();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("data-id=\"7&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("src=\"javascript:&quot;boom&quot;\""));
    }

    #[test]
    fn test_placeholder_and_photo() {
        let plain = Card::from_item(&item("1", "A"));
        assert_eq!(plain.image, CardImage::Placeholder);
        assert!(plain.to_html().contains("placeholder-image"));

        let mut with_photo = item("2", "B");
        with_photo.image = Some("data:image/png;base64,AAAA".to_string());
        let card = Card::from_item(&with_photo);
        assert!(matches!(card.image, CardImage::Photo { .. }));
        assert!(card.to_html().contains("<img src=\"data:image/png;base64,AAAA\" alt=\"B\">"));
    }

    #[test]
    fn test_location_line_omitted_when_empty() {
        let mut legacy = item("1", "Keys");
        legacy.location = String::new();
        let card = Card::from_item(&legacy);
        assert!(!card.to_html().contains("location-line"));
        assert!(!card.to_text().contains("Location:"));
    }

    #[test]
    fn test_status_badge_and_date() {
        let mut lost = item("1", "Umbrella");
        lost.status = ItemStatus::Lost;
        lost.created_at = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();

        let card = Card::from_item(&lost);
        assert_eq!(card.date, "Mar 05, 2024, 02:30 PM");
        let html = card.to_html();
        assert!(html.contains("status-badge status-lost\">LOST</span>"));
        assert!(card.to_text().starts_with("[LOST] Umbrella (#1)"));
    }

    #[test]
    fn test_page_applies_theme() {
        let gallery = Gallery::new();
        assert!(gallery.to_page(Theme::Dark).contains("<body class=\"dark-mode\">"));
        assert!(gallery.to_page(Theme::Light).contains("<body class=\"\">"));
    }
}
