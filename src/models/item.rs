//! Item types and identifiers.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Unique identifier for an item.
///
/// Whoever creates the record assigns the id: the report server uses its row
/// id, the local backend uses the client clock. The id is opaque and accepts
/// either a JSON number or a JSON string on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the ID as a number when it is one.
    #[must_use]
    pub fn as_number(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Whether an item was lost or found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Someone lost the item and is looking for it.
    Lost,
    /// Someone found the item and is holding it.
    Found,
}

impl ItemStatus {
    /// Returns all status variants.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Lost, Self::Found]
    }

    /// Returns the status as a lowercase string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lost => "lost",
            Self::Found => "found",
        }
    }

    /// Parses a status string, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "lost" => Some(Self::Lost),
            "found" => Some(Self::Found),
            _ => None,
        }
    }

    /// Maps the report API's `isFound` flag to a status.
    #[must_use]
    pub const fn from_found_flag(is_found: bool) -> Self {
        if is_found { Self::Found } else { Self::Lost }
    }

    /// Returns the report API's `isFound` flag for this status.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found)
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single lost or found report.
///
/// Serialized in the canonical camelCase shape used by the local backend.
/// Records written by older local variants (a `timestamp` in epoch millis and
/// no `location`) deserialize into the same type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier within the list.
    pub id: ItemId,
    /// Short item name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Where the item was lost or found.
    #[serde(default)]
    pub location: String,
    /// Lost or found.
    pub status: ItemStatus,
    /// How to reach the reporter.
    #[serde(default)]
    pub contact: String,
    /// Data URI or URL of the attached photo.
    #[serde(default, alias = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// When the report was created.
    #[serde(alias = "timestamp", deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Returns true if name, description, location or contact contains `term`.
    ///
    /// `term` must already be lowercase. An empty term matches every item.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        if term.is_empty() {
            return true;
        }
        [
            &self.name,
            &self.description,
            &self.location,
            &self.contact,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(term))
    }
}

/// Converts epoch milliseconds to a UTC timestamp.
#[must_use]
pub fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Parses a timestamp in any of the shapes backends have produced.
///
/// Accepted, in order: RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC), RFC 2822 and
/// a string of epoch milliseconds.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    s.parse::<i64>().ok().and_then(timestamp_from_millis)
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
    }

    let parsed = match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(ms) => timestamp_from_millis(ms),
        RawTimestamp::Text(s) => parse_timestamp(&s),
    };
    parsed.ok_or_else(|| serde::de::Error::custom("unrecognized timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            id: ItemId::new("1"),
            name: "Wallet".to_string(),
            description: "Brown leather".to_string(),
            location: "Library".to_string(),
            status: ItemStatus::Lost,
            contact: "555-0100".to_string(),
            image: None,
            created_at: timestamp_from_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[test]
    fn test_item_id_from_number_or_string() {
        let numeric: ItemId = serde_json::from_str("42").unwrap();
        let text: ItemId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, text);
        assert_eq!(numeric.as_number(), Some(42));
        assert_eq!(ItemId::new("abc").as_number(), None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(ItemStatus::parse("Lost"), Some(ItemStatus::Lost));
        assert_eq!(ItemStatus::parse(" FOUND "), Some(ItemStatus::Found));
        assert_eq!(ItemStatus::parse(""), None);
        assert_eq!(ItemStatus::parse("misplaced"), None);
        assert_eq!(ItemStatus::from_found_flag(true), ItemStatus::Found);
        assert!(!ItemStatus::Lost.is_found());
    }

    #[test]
    fn test_matches_is_case_insensitive_over_four_fields() {
        let item = sample_item();
        assert!(item.matches("wallet"));
        assert!(item.matches("leather"));
        assert!(item.matches("library"));
        assert!(item.matches("0100"));
        assert!(item.matches(""));
        assert!(!item.matches("lost"));
        assert!(!item.matches("umbrella"));
    }

    #[test]
    fn test_parse_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-05T14:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05 14:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("Tue, 05 Mar 2024 14:30:00 GMT"),
            Some(expected)
        );
        assert_eq!(
            parse_timestamp(&expected.timestamp_millis().to_string()),
            Some(expected)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_canonical_roundtrip() {
        let item = sample_item();
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(!json.contains("\"image\""));
        let back: Item = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn test_legacy_local_record() {
        let json = r#"{
            "id": 1700000000000,
            "name": "Keys",
            "description": "Car keys on a red ring",
            "status": "found",
            "contact": "",
            "timestamp": 1700000000000
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.id.as_str(), "1700000000000");
        assert_eq!(item.location, "");
        assert_eq!(item.status, ItemStatus::Found);
        assert_eq!(item.created_at.timestamp_millis(), 1_700_000_000_000);
    }
}
