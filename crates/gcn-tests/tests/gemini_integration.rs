use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use gcn_core::inference::InferenceService;
use gcn_core::{AppConfig, Document, DocumentKind, FailureKind};
use gcn_extraction::{GeminiClient, RemoteHandle};

// ---------------------------------------------------------------------------
// Local stand-in for the Gemini Files API
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct FilesApi {
    session_url: String,
    file_state: &'static str,
    deleted: Arc<Mutex<Vec<String>>>,
}

async fn start_upload(State(api): State<FilesApi>) -> impl IntoResponse {
    ([("x-goog-upload-url", api.session_url.clone())], "")
}

async fn finalize_upload(State(api): State<FilesApi>) -> Json<Value> {
    Json(json!({
        "file": {
            "name": "files/scan01",
            "uri": "https://files.example/scan01",
            "mimeType": "application/pdf",
            "state": api.file_state
        }
    }))
}

async fn delete_file(State(api): State<FilesApi>, Path(id): Path<String>) -> Json<Value> {
    api.deleted.lock().unwrap().push(format!("files/{id}"));
    Json(json!({}))
}

/// Serves the Files API on a local port and returns a client pointed at it.
async fn files_api(file_state: &'static str) -> (Arc<GeminiClient>, Arc<Mutex<Vec<String>>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let deleted = Arc::new(Mutex::new(Vec::new()));

    let api = FilesApi {
        session_url: format!("{base}/upload-session"),
        file_state,
        deleted: deleted.clone(),
    };
    let router = Router::new()
        .route("/upload/v1beta/files", post(start_upload))
        .route("/upload-session", post(finalize_upload))
        .route("/v1beta/files/{id}", delete(delete_file))
        .with_state(api);
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = AppConfig::from_lookup(|key| match key {
        "GEMINI_API_KEY" => Some("test-key".to_string()),
        "GEMINI_BASE_URL" => Some(base.clone()),
        _ => None,
    })
    .unwrap();
    (Arc::new(GeminiClient::new(&config).unwrap()), deleted)
}

fn scan() -> Document {
    Document::new("scan01.pdf", b"%PDF-1.7".to_vec())
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_rejected_by_service_is_deleted() {
    let (client, deleted) = files_api("FAILED").await;

    let err = client.upload(&scan(), "application/pdf").await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::Api);
    assert!(err.to_string().contains("files/scan01"));
    assert_eq!(*deleted.lock().unwrap(), vec!["files/scan01".to_string()]);
}

#[tokio::test]
async fn acquire_of_rejected_upload_leaves_nothing_remote() {
    let (client, deleted) = files_api("FAILED").await;
    let service: Arc<dyn InferenceService> = client;

    let result = RemoteHandle::acquire(service, &scan(), DocumentKind::Pdf).await;

    assert!(result.is_err());
    assert_eq!(deleted.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn active_upload_is_deleted_only_on_release() {
    let (client, deleted) = files_api("ACTIVE").await;
    let service: Arc<dyn InferenceService> = client;

    let handle = RemoteHandle::acquire(service, &scan(), DocumentKind::Pdf)
        .await
        .unwrap();
    assert_eq!(handle.reference().name, "files/scan01");
    assert!(deleted.lock().unwrap().is_empty());

    handle.release().await;

    assert_eq!(*deleted.lock().unwrap(), vec!["files/scan01".to_string()]);
}
