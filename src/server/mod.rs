//! Report API server.
//!
//! Serves the HTTP API that [`crate::RemoteStore`] talks to, backed by a
//! `SQLite` table. Photos are stored inline as data URIs.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | `GET` | `/api/reports` | `200` array of records, oldest first |
//! | `POST` | `/api/report` | `201 {message, report}`, `400`, `413` |
//! | `DELETE` | `/api/report/{id}` | `200 {message}`, `404 {message}` |

pub mod db;
mod handlers;

pub use db::{NewReport, ReportDb, ReportRow};
pub use handlers::{CREATED_MESSAGE, MISSING_FIELDS_MESSAGE, ReportRecord};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::LostboardConfig;
use crate::services::ImageEncoder;
use crate::{Error, Result};

/// Room for the text fields and multipart framing on top of the photo.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    db: Arc<ReportDb>,
    encoder: ImageEncoder,
}

impl AppState {
    /// Creates handler state over `db`.
    #[must_use]
    pub fn new(db: ReportDb, encoder: ImageEncoder) -> Self {
        Self {
            db: Arc::new(db),
            encoder,
        }
    }

    /// Returns the report database.
    #[must_use]
    pub fn db(&self) -> &ReportDb {
        &self.db
    }
}

/// Builds the API router with tracing, CORS and the upload body limit.
pub fn router(state: AppState) -> Router {
    let body_limit = usize::try_from(state.encoder.limit())
        .unwrap_or(usize::MAX)
        .saturating_add(FORM_OVERHEAD_BYTES);

    let api = Router::new()
        .route("/reports", get(handlers::list_reports))
        .route("/report", post(handlers::create_report))
        .route("/report/{id}", delete(handlers::delete_report));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on an already bound listener until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails while running.
pub async fn serve_on(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "serve".to_string(),
            cause: e.to_string(),
        })
}

/// Opens the database and serves the API on the configured address until
/// Ctrl-C.
///
/// # Errors
///
/// Returns an error if the database cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: &LostboardConfig) -> Result<()> {
    let db_path = config.db_path();
    let db = ReportDb::open(&db_path)?;
    let state = AppState::new(db, ImageEncoder::with_limit(config.max_image_bytes));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::InvalidInput(format!("invalid server address: {e}")))?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::OperationFailed {
            operation: "bind".to_string(),
            cause: format!("{addr}: {e}"),
        })?;

    tracing::info!(%addr, db = %db_path.display(), "Report API listening");
    serve_on(listener, state, shutdown_signal()).await?;
    tracing::info!("Report API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
