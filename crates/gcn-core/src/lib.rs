pub mod api_types;
pub mod config;
pub mod document;
pub mod error;
pub mod inference;
pub mod record;
pub mod report;
pub mod schema;

pub use config::AppConfig;
pub use document::{Document, DocumentKind};
pub use error::{FailureKind, GcnError, Result};
pub use inference::{ExtractionRequest, InferenceService, RemoteReference};
pub use record::LandTitleRecord;
pub use report::{BatchReport, Cell, DocumentFailure, ReportTable, COLUMN_ORDER};
pub use schema::{FieldSchema, FieldSpec, FieldType, FIELD_SCHEMA};
