pub mod export;
pub mod extract;
pub mod health;
pub mod schema;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use gcn_core::api_types::ErrorResponse;

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}
