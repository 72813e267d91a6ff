use std::sync::Arc;
use std::time::Instant;

use gcn_core::error::{GcnError, Result};
use gcn_core::inference::{ExtractionRequest, InferenceService};

/// Performs the single generate call for a document. No retries: whatever goes wrong
/// during the call surfaces as an API failure for that document.
pub struct Invoker {
    service: Arc<dyn InferenceService>,
}

impl Invoker {
    pub fn new(service: Arc<dyn InferenceService>) -> Self {
        Self { service }
    }

    pub async fn invoke(&self, request: &ExtractionRequest, source_name: &str) -> Result<String> {
        let started = Instant::now();

        tracing::debug!(
            model = %self.service.model(),
            source = %source_name,
            remote = %request.file.name,
            "Sending extraction request to inference service"
        );

        let text = self.service.generate(request).await.map_err(|e| {
            tracing::error!(source = %source_name, error = %e, "Extraction request failed");
            classify(e)
        })?;

        tracing::debug!(
            source = %source_name,
            response_len = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Received extraction response"
        );

        Ok(text)
    }
}

fn classify(error: GcnError) -> GcnError {
    match error {
        e @ (GcnError::Api { .. } | GcnError::Http(_)) => e,
        other => GcnError::api(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcn_core::error::FailureKind;

    #[test]
    fn test_non_api_errors_become_api_failures() {
        assert_eq!(
            classify(GcnError::Internal("socket closed".into())).kind(),
            FailureKind::Api
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(classify(GcnError::from(json_err)).kind(), FailureKind::Api);
        let api = classify(GcnError::Api {
            status: Some(503),
            message: "unavailable".into(),
        });
        assert!(matches!(api, GcnError::Api { status: Some(503), .. }));
    }
}
