use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Schema
        .route("/api/schema", get(handlers::schema::get_schema))
        // Extraction
        .route(
            "/api/extract",
            post(handlers::extract::extract_documents)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        // Export
        .route("/api/export", post(handlers::export::export_spreadsheet))
}
