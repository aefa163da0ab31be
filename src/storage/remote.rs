//! Remote item store over the report HTTP API.
//!
//! # Endpoints
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `{base}/reports` | List records |
//! | `POST` | `{base}/report` | Create a record (multipart form) |
//! | `DELETE` | `{base}/report/{id}` | Delete a record |
//!
//! # Record mapping
//!
//! Records come back in the API's own shape and are mapped into [`Item`]
//! here, not by callers:
//!
//! | Record field | Item field |
//! |--------------|------------|
//! | `id` / `reportid` | `id` |
//! | `itemname` / `name` | `name` |
//! | `isFound` (`1`/`0`, bool) or `status` | `status` |
//! | `imgurl` | `image` |
//! | `reportdate` / `date` | `created_at` |

use chrono::Utc;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::traits::ItemStore;
use crate::models::{Draft, Item, ItemId, ItemStatus, parse_timestamp, timestamp_from_millis};
use crate::{Error, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Item store backed by the report HTTP API.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    /// HTTP client with connection pooling.
    client: Client,
    /// API root, e.g. `http://127.0.0.1:5000/api`.
    base_url: Url,
}

impl RemoteStore {
    /// Creates a remote store for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a remote store with a custom request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| Error::InvalidInput(format!("invalid API base URL '{base_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(Error::InvalidInput(format!(
                "API base URL must be http(s): {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent(format!("lostboard/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .pool_max_idle_per_host(4)
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self { client, base_url })
    }

    /// Returns the API root.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Joins path segments onto the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn draft_form(draft: &Draft) -> Result<Form> {
        let mut form = Form::new()
            .text("itemname", draft.name.clone())
            .text("description", draft.description.clone())
            .text("location", draft.location.clone())
            .text("isFound", if draft.status.is_found() { "1" } else { "0" })
            .text("contact", draft.contact.clone());

        if let Some(image) = &draft.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)
                .map_err(|e| Error::SubmitFailed(format!("invalid image type: {e}")))?;
            form = form.part("image", part);
        }
        Ok(form)
    }
}

/// Extracts a human-readable message from an error response body.
fn error_message(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        status.to_string()
    } else {
        format!("{status} {message}")
    }
}

/// The `isFound` flag in whichever shape the API sent.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FoundFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FoundFlag {
    fn is_found(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Text(s) => s.trim().parse::<i64>().is_ok_and(|n| n != 0),
        }
    }
}

/// A report record as served by the API.
#[derive(Debug, Deserialize)]
struct ReportRecord {
    #[serde(alias = "reportid")]
    id: ItemId,
    #[serde(alias = "name")]
    itemname: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default, rename = "isFound")]
    is_found: Option<FoundFlag>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    contact: Option<String>,
    #[serde(default, alias = "imageUrl")]
    imgurl: Option<String>,
    #[serde(default, alias = "date", alias = "createdAt")]
    reportdate: Option<Value>,
}

impl TryFrom<ReportRecord> for Item {
    type Error = Error;

    fn try_from(record: ReportRecord) -> Result<Self> {
        let status = match (&record.is_found, &record.status) {
            (Some(flag), _) => ItemStatus::from_found_flag(flag.is_found()),
            (None, Some(s)) => ItemStatus::parse(s).ok_or_else(|| {
                Error::FetchFailed(format!("record {} has unknown status '{s}'", record.id))
            })?,
            (None, None) => ItemStatus::Lost,
        };

        let created_at = match &record.reportdate {
            Some(Value::Number(n)) => n.as_i64().and_then(timestamp_from_millis),
            Some(Value::String(s)) => parse_timestamp(s),
            _ => None,
        }
        .ok_or_else(|| {
            Error::FetchFailed(format!("record {} has a missing or malformed date", record.id))
        })?;

        Ok(Self {
            id: record.id,
            name: record.itemname,
            description: record.description.unwrap_or_default(),
            location: record.location.unwrap_or_default(),
            status,
            contact: record.contact.unwrap_or_default(),
            image: record.imgurl.filter(|url| !url.is_empty()),
            created_at,
        })
    }
}

/// Maps a list response (`[...]` or `{"data": [...]}`) into items.
///
/// A record that cannot be mapped is logged and left out so one bad row
/// does not blank the board.
fn map_list(body: Value) -> Vec<Item> {
    let rows = match body {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    rows.into_iter()
        .filter_map(|row| {
            let mapped = serde_json::from_value::<ReportRecord>(row)
                .map_err(|e| Error::FetchFailed(format!("malformed record: {e}")))
                .and_then(Item::try_from);
            match mapped {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable report record");
                    None
                },
            }
        })
        .collect()
}

/// Stand-in for a created report when the API does not echo the record.
///
/// The id is unknown (empty) until the next list.
fn provisional_item(draft: &Draft, image_url: Option<String>) -> Item {
    Item {
        id: ItemId::new(String::new()),
        name: draft.name.clone(),
        description: draft.description.clone(),
        location: draft.location.clone(),
        status: draft.status,
        contact: draft.contact.clone(),
        image: image_url
            .filter(|url| !url.is_empty())
            .or_else(|| draft.image.as_ref().map(crate::models::EncodedImage::data_uri)),
        created_at: Utc::now(),
    }
}

/// Body of a successful create. Some API versions only send `message` and
/// `imgUrl`.
#[derive(Debug, Default, Deserialize)]
struct CreateResponse {
    #[serde(default)]
    report: Option<Value>,
    #[serde(default, rename = "imgUrl", alias = "imgurl")]
    img_url: Option<String>,
}

impl ItemStore for RemoteStore {
    async fn list(&self) -> Result<Vec<Item>> {
        let url = self.endpoint(&["reports"]);
        tracing::debug!(%url, "Fetching reports");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::FetchFailed(error_message(status, &body)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::FetchFailed(format!("invalid response body: {e}")))?;
        let items = map_list(body);
        tracing::debug!(count = items.len(), "Fetched reports");
        Ok(items)
    }

    async fn create(&self, draft: &Draft) -> Result<Item> {
        if let Some(image) = &draft.image {
            image.ensure_within_ceiling()?;
        }

        let url = self.endpoint(&["report"]);
        let form = Self::draft_form(draft)?;
        tracing::debug!(%url, name = %draft.name, "Submitting report");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::SubmitFailed(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(Error::SubmitFailed(error_message(status, &body)));
        }

        // A 2xx means the report exists; the record in the body is a bonus.
        let created: CreateResponse = serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable create response body");
            CreateResponse::default()
        });
        let record = created.report.map(|report| {
            serde_json::from_value::<ReportRecord>(report)
                .map_err(|e| Error::SubmitFailed(format!("malformed record: {e}")))
                .and_then(Item::try_from)
        });
        let item = match record {
            Some(Ok(item)) => item,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Created report record unreadable");
                provisional_item(draft, created.img_url)
            },
            None => provisional_item(draft, created.img_url),
        };

        tracing::info!(id = %item.id, "Report created");
        Ok(item)
    }

    async fn delete(&self, id: &ItemId) -> Result<bool> {
        let url = self.endpoint(&["report", id.as_str()]);
        tracing::debug!(%url, "Deleting report");

        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| Error::DeleteFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%id, "Report already gone");
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::DeleteFailed(error_message(status, &body)));
        }

        tracing::info!(%id, "Report deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_endpoint_encodes_segments() {
        let store = RemoteStore::new("http://127.0.0.1:5000/api/").unwrap();
        assert_eq!(
            store.endpoint(&["reports"]).as_str(),
            "http://127.0.0.1:5000/api/reports"
        );
        assert_eq!(
            store.endpoint(&["report", "a/b c"]).as_str(),
            "http://127.0.0.1:5000/api/report/a%2Fb%20c"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(
            RemoteStore::new("not a url"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            RemoteStore::new("ftp://example.com/api"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_maps_api_record_shape() {
        let body = json!([{
            "reportid": 7,
            "itemname": "Wallet",
            "description": "Brown leather",
            "location": "Library",
            "isFound": 0,
            "contact": "555-0100",
            "imgurl": null,
            "reportdate": "2024-03-05 14:30:00"
        }]);

        let items = map_list(body);
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.id.as_str(), "7");
        assert_eq!(item.name, "Wallet");
        assert_eq!(item.status, ItemStatus::Lost);
        assert_eq!(item.image, None);
        assert_eq!(
            item.created_at,
            Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_maps_formatted_record_shape() {
        let body = json!({"data": [{
            "id": "12",
            "name": "Umbrella",
            "description": "Black",
            "location": "Gym",
            "status": "found",
            "contact": "front desk",
            "imgurl": "https://img.example/u.png",
            "date": "Tue, 05 Mar 2024 14:30:00 GMT"
        }]});

        let items = map_list(body);
        assert_eq!(items[0].status, ItemStatus::Found);
        assert_eq!(items[0].image.as_deref(), Some("https://img.example/u.png"));
    }

    #[test]
    fn test_found_flag_shapes() {
        for (flag, expected) in [
            (json!(1), ItemStatus::Found),
            (json!("1"), ItemStatus::Found),
            (json!(true), ItemStatus::Found),
            (json!("0"), ItemStatus::Lost),
            (json!("yes"), ItemStatus::Lost),
        ] {
            let body = json!([{
                "id": 1, "itemname": "x", "isFound": flag,
                "reportdate": 1_700_000_000_000_i64
            }]);
            assert_eq!(map_list(body)[0].status, expected);
        }
    }

    #[test]
    fn test_unreadable_records_are_skipped() {
        let body = json!([
            {"id": 1, "itemname": "Wallet", "reportdate": "2024-03-05 14:30:00"},
            {"id": 2, "itemname": "Keys", "reportdate": "someday"},
            {"id": 3, "itemname": "Scarf"},
            {"id": 4, "itemname": "Hat", "status": "stolen", "reportdate": 1_700_000_000_000_i64},
            {"itemname": "no id"},
            {"id": 5, "itemname": "Umbrella", "reportdate": 1_700_000_000_000_i64}
        ]);

        let names: Vec<_> = map_list(body).into_iter().map(|item| item.name).collect();
        assert_eq!(names, ["Wallet", "Umbrella"]);
    }

    #[test]
    fn test_provisional_item_from_draft() {
        let draft = Draft {
            name: "Scarf".to_string(),
            description: "Green wool".to_string(),
            location: "Bus stop".to_string(),
            status: ItemStatus::Found,
            contact: "555-0199".to_string(),
            image: None,
        };

        let item = provisional_item(&draft, Some("https://img.example/s.png".to_string()));
        assert!(item.id.as_str().is_empty());
        assert_eq!(item.name, "Scarf");
        assert_eq!(item.status, ItemStatus::Found);
        assert_eq!(item.image.as_deref(), Some("https://img.example/s.png"));

        assert_eq!(provisional_item(&draft, Some(String::new())).image, None);
    }

    #[test]
    fn test_unexpected_body_is_empty_list() {
        assert!(map_list(json!({"message": "ok"})).is_empty());
        assert!(map_list(json!("nope")).is_empty());
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"message": "Missing required fields (Item Name, Description)."}"#
            ),
            "400 Bad Request Missing required fields (Item Name, Description)."
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down\n"),
            "502 Bad Gateway upstream down"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "500 Internal Server Error"
        );
    }
}
