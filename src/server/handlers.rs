//! Report API handlers.

use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use super::AppState;
use super::db::{NewReport, REPORT_DATE_FORMAT, ReportRow};
use crate::Error;

/// Message for a successful create.
pub const CREATED_MESSAGE: &str = "Report submitted successfully!";

/// Message for a create without name or description.
pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields (Item Name, Description).";

/// A report as served by the API.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRecord {
    /// Row id.
    pub id: i64,
    /// Item name.
    pub itemname: String,
    /// Description.
    pub description: String,
    /// Location.
    pub location: String,
    /// `1` when found, `0` when lost.
    #[serde(rename = "isFound")]
    pub is_found: u8,
    /// Reporter contact.
    pub contact: String,
    /// Photo URI, `null` when absent.
    pub imgurl: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS` in UTC.
    pub reportdate: String,
}

impl From<ReportRow> for ReportRecord {
    fn from(row: ReportRow) -> Self {
        Self {
            id: row.reportid,
            itemname: row.itemname,
            description: row.description,
            location: row.location,
            is_found: u8::from(row.is_found),
            contact: row.contact,
            imgurl: row.imgurl,
            reportdate: row.reportdate.format(REPORT_DATE_FORMAT).to_string(),
        }
    }
}

/// Error response with a JSON `{"message": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::PayloadTooLarge { .. } => Self::new(StatusCode::PAYLOAD_TOO_LARGE, err.to_string()),
            Error::InvalidInput(_) | Error::Validation { .. } => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            },
            _ => {
                tracing::error!(error = %err, "Request failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

/// `GET /reports`
pub async fn list_reports(State(state): State<AppState>) -> Result<Json<Vec<ReportRecord>>, ApiError> {
    let rows = state.db.list()?;
    tracing::debug!(count = rows.len(), "Listing reports");
    Ok(Json(rows.into_iter().map(ReportRecord::from).collect()))
}

/// Parses the `isFound` form value. Anything unparseable is lost.
fn parse_found_flag(value: &str) -> bool {
    value.trim().parse::<i64>().is_ok_and(|n| n != 0)
}

/// `POST /report` (multipart form)
pub async fn create_report(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut report = NewReport::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
            if file_name.is_empty() || bytes.is_empty() {
                continue;
            }
            let image = state.encoder.encode_bytes(file_name, bytes.to_vec())?;
            report.imgurl = Some(image.data_uri());
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        match name.as_str() {
            "itemname" => report.itemname = value.trim().to_string(),
            "description" => report.description = value.trim().to_string(),
            "location" => report.location = value.trim().to_string(),
            "isFound" => report.is_found = parse_found_flag(&value),
            "contact" => report.contact = value.trim().to_string(),
            other => tracing::debug!(field = other, "Ignoring unknown form field"),
        }
    }

    if report.itemname.is_empty() || report.description.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, MISSING_FIELDS_MESSAGE));
    }

    let row = state.db.insert(&report)?;
    tracing::info!(reportid = row.reportid, "Report created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": CREATED_MESSAGE,
            "report": ReportRecord::from(row),
        })),
    ))
}

/// `DELETE /report/{id}`
pub async fn delete_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let not_found = || ApiError::new(StatusCode::NOT_FOUND, format!("Report ID {id} not found."));

    let reportid: i64 = id.trim().parse().map_err(|_| not_found())?;
    if !state.db.delete(reportid)? {
        return Err(not_found());
    }

    tracing::info!(reportid, "Report deleted");
    Ok(Json(json!({
        "message": format!("Report ID {reportid} deleted successfully."),
    })))
}
