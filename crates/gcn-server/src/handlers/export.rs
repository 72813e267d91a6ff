use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use gcn_core::LandTitleRecord;
use gcn_export::export_report;

use super::error_response;

/// POST /api/export — encode a report's records as an xlsx download.
pub async fn export_spreadsheet(Json(records): Json<Vec<LandTitleRecord>>) -> Response {
    match export_report(&records) {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, export.mime_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.file_name),
                ),
            ],
            export.bytes,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, rows = records.len(), "Spreadsheet export failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
