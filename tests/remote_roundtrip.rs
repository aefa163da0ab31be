//! End-to-end tests: `RemoteStore` against a live report API server.
#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lostboard::models::{Draft, ItemStatus};
use lostboard::server::{AppState, ReportDb, serve_on};
use lostboard::services::{ImageEncoder, REPORT_SUCCESS_MESSAGE};
use lostboard::{Controller, DeleteOutcome, DraftForm, EncodedImage, ItemStore, RemoteStore, SyncMode};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct TestServer {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<lostboard::Result<()>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::new(ReportDb::in_memory().unwrap(), ImageEncoder::new());
        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve_on(listener, state, async move {
            let _ = rx.await;
        }));
        Self {
            base_url: format!("http://{addr}/api"),
            shutdown: Some(tx),
            handle,
        }
    }

    fn store(&self) -> RemoteStore {
        RemoteStore::new(&self.base_url).unwrap()
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await.unwrap().unwrap();
    }
}

fn keys_draft() -> Draft {
    Draft {
        name: "Keys".to_string(),
        description: "Three keys on a red ring".to_string(),
        location: "Cafeteria".to_string(),
        status: ItemStatus::Found,
        contact: "desk@example.org".to_string(),
        image: None,
    }
}

#[tokio::test]
async fn test_create_list_delete_over_http() {
    let server = TestServer::start().await;
    let store = server.store();
    assert_eq!(store.sync_mode(), SyncMode::Refetch);
    assert!(store.list().await.unwrap().is_empty());

    let photo = EncodedImage {
        file_name: "keys.png".to_string(),
        mime: "image/png".to_string(),
        bytes: b"png bytes".to_vec(),
    };
    let created = store
        .create(&keys_draft().with_image(photo.clone()))
        .await
        .unwrap();
    assert_eq!(created.name, "Keys");
    assert_eq!(created.status, ItemStatus::Found);
    assert_eq!(created.image.as_deref(), Some(photo.data_uri().as_str()));

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].contact, "desk@example.org");

    assert!(store.delete(&created.id).await.unwrap());
    assert!(!store.delete(&created.id).await.unwrap());
    assert!(store.list().await.unwrap().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn test_controller_over_remote_store() {
    let server = TestServer::start().await;
    let mut controller = Controller::new(server.store());
    controller.load().await.unwrap();
    assert!(controller.gallery().is_empty_state());

    controller.open_report();
    controller.fill(DraftForm {
        name: "Scarf".to_string(),
        description: "Green wool".to_string(),
        location: "Bus stop".to_string(),
        status: "lost".to_string(),
        contact: "555-0199".to_string(),
        image: None,
    });
    let item = controller.submit().await.unwrap();
    assert!(!controller.surface().is_open());
    assert_eq!(controller.cache().len(), 1);
    assert_eq!(controller.gallery().cards()[0].name, "Scarf");

    let outcome = controller.delete(&item.id, |_| true).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(controller.cache().is_empty());
    assert!(controller.gallery().is_empty_state());

    server.stop().await;
}

#[tokio::test]
async fn test_unreachable_server_fails_load() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = RemoteStore::new(&format!("http://{addr}/api")).unwrap();
    let mut controller = Controller::new(store);
    let err = controller.load().await.unwrap_err();
    assert!(err.is_backend_failure());
    assert!(controller.notice().is_some());
}

type Reports = Arc<Mutex<Vec<Value>>>;

async fn legacy_list(State(reports): State<Reports>) -> Json<Value> {
    Json(Value::Array(reports.lock().unwrap().clone()))
}

/// Answers a create the way older API versions do: no record in the body.
async fn legacy_create(
    State(reports): State<Reports>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let mut name = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("itemname") {
            name = field.text().await.unwrap();
        }
    }

    let mut reports = reports.lock().unwrap();
    let id = reports.len() + 1;
    reports.push(json!({
        "reportid": id,
        "itemname": name,
        "description": "Green wool",
        "location": "Bus stop",
        "isFound": 0,
        "contact": "555-0199",
        "imgurl": null,
        "reportdate": "2024-03-05 14:30:00"
    }));
    (
        StatusCode::CREATED,
        Json(json!({"message": "Report submitted successfully!", "imgUrl": null})),
    )
}

async fn start_legacy_server() -> String {
    let app = Router::new()
        .route("/api/reports", get(legacy_list))
        .route("/api/report", post(legacy_create))
        .with_state(Reports::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn test_create_without_echoed_record() {
    let base_url = start_legacy_server().await;
    let store = RemoteStore::new(&base_url).unwrap();

    let item = store.create(&keys_draft()).await.unwrap();
    assert!(item.id.as_str().is_empty());
    assert_eq!(item.name, "Keys");
    assert_eq!(item.status, ItemStatus::Found);

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id.as_str(), "1");
}

#[tokio::test]
async fn test_controller_submit_without_echoed_record() {
    let base_url = start_legacy_server().await;
    let mut controller = Controller::new(RemoteStore::new(&base_url).unwrap());
    controller.load().await.unwrap();

    controller.open_report();
    controller.fill(DraftForm {
        name: "Scarf".to_string(),
        description: "Green wool".to_string(),
        location: "Bus stop".to_string(),
        status: "lost".to_string(),
        contact: "555-0199".to_string(),
        image: None,
    });
    controller.submit().await.unwrap();

    assert!(!controller.surface().is_open());
    assert_eq!(controller.cache().len(), 1);
    assert_eq!(controller.cache().items()[0].id.as_str(), "1");
    assert_eq!(controller.gallery().cards()[0].name, "Scarf");
    assert_eq!(controller.notice().unwrap().message, REPORT_SUCCESS_MESSAGE);
}
