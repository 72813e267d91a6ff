use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{info, warn};

use gcn_core::api_types::ExtractResponse;
use gcn_core::Document;
use gcn_extraction::LogProgress;

use super::error_response;
use crate::state::AppState;

/// POST /api/extract — run every uploaded file through the extraction pipeline.
///
/// Each multipart part carrying a file name is one document. Documents are processed
/// in upload order; failures are listed in the response next to the successful rows.
pub async fn extract_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let mut documents = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Rejected malformed multipart upload");
                return error_response(StatusCode::BAD_REQUEST, e.body_text());
            }
        };

        let Some(name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        match field.bytes().await {
            Ok(bytes) => documents.push(Document::new(name, bytes.to_vec())),
            Err(e) => {
                warn!(file = %name, error = %e, "Failed to read uploaded file");
                return error_response(e.status(), e.body_text());
            }
        }
    }

    if documents.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "no files were uploaded");
    }

    info!(count = documents.len(), "Received documents for extraction");

    let report = state.pipeline.extract_batch(&documents, &LogProgress).await;

    (StatusCode::OK, Json(ExtractResponse::from(report))).into_response()
}
