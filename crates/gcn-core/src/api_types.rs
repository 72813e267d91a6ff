use serde::{Deserialize, Serialize};

use crate::record::LandTitleRecord;
use crate::report::{BatchReport, Cell, DocumentFailure};
use crate::schema::FieldSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaResponse {
    pub fields: Vec<FieldSpec>,
    pub json_schema: serde_json::Value,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    pub records: Vec<LandTitleRecord>,
    pub failures: Vec<DocumentFailure>,
    pub processed: usize,
    pub succeeded: usize,
}

impl From<BatchReport> for ExtractResponse {
    fn from(report: BatchReport) -> Self {
        let table = report.table();
        Self {
            columns: table.columns,
            rows: table.rows,
            processed: report.processed(),
            succeeded: report.records.len(),
            records: report.records,
            failures: report.failures,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
