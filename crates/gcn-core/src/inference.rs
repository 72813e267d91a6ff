use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::Result;

/// A document registered with the remote service's file storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReference {
    /// Resource name used for deletion, e.g. `files/abc123`.
    pub name: String,
    /// URI the generate call refers to.
    pub uri: String,
    pub mime_type: String,
}

/// Instruction plus structured-output constraint for one generate call against `file`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionRequest {
    pub file: RemoteReference,
    pub instruction: String,
    pub constraint: serde_json::Value,
    pub response_mime_type: &'static str,
}

/// The remote multimodal model: upload, generate against an upload, delete the upload.
#[async_trait]
pub trait InferenceService: Send + Sync {
    fn model(&self) -> &str;

    async fn upload(&self, document: &Document, mime_type: &str) -> Result<RemoteReference>;

    /// One generate call; returns the model's response text verbatim.
    async fn generate(&self, request: &ExtractionRequest) -> Result<String>;

    async fn delete(&self, reference: &RemoteReference) -> Result<()>;
}
