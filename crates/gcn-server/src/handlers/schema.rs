use axum::{http::StatusCode, response::IntoResponse, Json};

use gcn_core::api_types::SchemaResponse;
use gcn_core::{COLUMN_ORDER, FIELD_SCHEMA};

/// GET /api/schema — the extracted fields and the report column order.
pub async fn get_schema() -> impl IntoResponse {
    let response = SchemaResponse {
        fields: FIELD_SCHEMA.fields.to_vec(),
        json_schema: FIELD_SCHEMA.to_json_schema(),
        columns: COLUMN_ORDER.iter().map(|c| c.to_string()).collect(),
    };
    (StatusCode::OK, Json(response))
}
