use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use gcn_core::config::AppConfig;
use gcn_core::document::Document;
use gcn_core::error::{GcnError, Result};
use gcn_core::inference::{ExtractionRequest, InferenceService, RemoteReference};

const API_VERSION: &str = "v1beta";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Gemini REST client covering the Files API and `generateContent`.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: Url,
}

// ── Gemini API request/response types ──────────────────────────────────────

#[derive(Debug, Serialize)]
struct UploadStartRequest<'a> {
    file: UploadMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct UploadMetadata<'a> {
    display_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: FileResource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    name: String,
    uri: String,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    File { file_data: FileData<'a> },
}

#[derive(Debug, Serialize)]
struct FileData<'a> {
    mime_type: &'a str,
    file_uri: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

// ── Implementation ─────────────────────────────────────────────────────────

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|e| GcnError::Config(format!("invalid endpoint '{raw}': {e}")))
    }

    fn generate_body<'a>(request: &'a ExtractionRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part::Text {
                        text: &request.instruction,
                    },
                    Part::File {
                        file_data: FileData {
                            mime_type: &request.file.mime_type,
                            file_uri: &request.file.uri,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: request.response_mime_type,
                response_schema: &request.constraint,
            },
        }
    }

    /// Concatenates the text parts of the first candidate, the way the model's
    /// answer is presented as a single string.
    fn response_text(response: GenerateResponse) -> Result<String> {
        let block_reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(", prompt blocked: {r}"))
            .unwrap_or_default();

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(GcnError::api(format!(
                "response contained no candidates{block_reason}"
            )));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GcnError::api(format!(
                "candidate contained no text (finish reason: {}){block_reason}",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            )));
        }
        Ok(text)
    }

    /// Turns a non-success response into an `ApiFailure`, keeping the service's message.
    async fn api_error(response: reqwest::Response, action: &str) -> GcnError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        GcnError::Api {
            status: Some(status.as_u16()),
            message: format!("{action} failed: {}", error_message(&body)),
        }
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{status}: {}", envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl InferenceService for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn upload(&self, document: &Document, mime_type: &str) -> Result<RemoteReference> {
        let start_url = self.endpoint(&format!("upload/{API_VERSION}/files"))?;

        tracing::debug!(
            source = %document.name(),
            mime_type = %mime_type,
            bytes = document.len(),
            "Starting resumable upload to Gemini Files API"
        );

        let response = self
            .client
            .post(start_url)
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", document.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadMetadata {
                    display_name: document.name(),
                },
            })
            .send()
            .await
            .map_err(|e| GcnError::api(format!("upload start request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "upload start").await);
        }

        let upload_url = response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| GcnError::api("upload start response carried no upload URL"))?;

        let response = self
            .client
            .post(upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(document.content().to_vec())
            .send()
            .await
            .map_err(|e| GcnError::api(format!("upload request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "upload").await);
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| GcnError::api(format!("failed to parse upload response: {e}")))?;

        let failed = uploaded.file.state.as_deref() == Some("FAILED");
        let reference = RemoteReference {
            name: uploaded.file.name,
            uri: uploaded.file.uri,
            mime_type: uploaded
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        };

        if failed {
            // the file exists remotely even though processing failed
            if let Err(e) = self.delete(&reference).await {
                tracing::warn!(
                    source = %document.name(),
                    remote = %reference.name,
                    error = %e,
                    "Failed to delete upload rejected by the Files API"
                );
            }
            return Err(GcnError::api(format!(
                "remote processing of {} failed",
                reference.name
            )));
        }

        Ok(reference)
    }

    async fn generate(&self, request: &ExtractionRequest) -> Result<String> {
        let url = self.endpoint(&format!(
            "{API_VERSION}/models/{}:generateContent",
            self.model
        ))?;

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::generate_body(request))
            .send()
            .await
            .map_err(|e| GcnError::api(format!("generateContent request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "generateContent").await);
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GcnError::api(format!("failed to parse generateContent response: {e}")))?;

        Self::response_text(parsed)
    }

    async fn delete(&self, reference: &RemoteReference) -> Result<()> {
        let url = self.endpoint(&format!("{API_VERSION}/{}", reference.name))?;

        let response = self
            .client
            .delete(url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| GcnError::api(format!("delete request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "delete").await);
        }
        Ok(())
    }
}
