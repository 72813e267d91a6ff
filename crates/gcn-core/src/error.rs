use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcnError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error{}: {message}", status_suffix(.status))]
    Api { status: Option<u16>, message: String },

    #[error("Normalization error: {0}")]
    Normalization(String),

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GcnError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            status: None,
            message: message.into(),
        }
    }

    /// Which of the per-document failure classes this error belongs to.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Http(_) | Self::Api { .. } => FailureKind::Api,
            Self::Json(_) | Self::Normalization(_) => FailureKind::Normalization,
            Self::Config(_) => FailureKind::Configuration,
            Self::UnsupportedDocument(_) | Self::Export(_) | Self::Internal(_) => {
                FailureKind::Unclassified
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Api,
    Normalization,
    Unclassified,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Api => "api",
            Self::Normalization => "normalization",
            Self::Unclassified => "unclassified",
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, GcnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status() {
        let err = GcnError::Api {
            status: Some(429),
            message: "quota exceeded".into(),
        };
        assert_eq!(err.to_string(), "API error (status 429): quota exceeded");
        assert_eq!(GcnError::api("boom").to_string(), "API error: boom");
    }

    #[test]
    fn test_kinds_follow_taxonomy() {
        assert_eq!(GcnError::api("x").kind(), FailureKind::Api);
        assert_eq!(
            GcnError::Normalization("x".into()).kind(),
            FailureKind::Normalization
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(GcnError::from(json_err).kind(), FailureKind::Normalization);
        assert_eq!(GcnError::Config("x".into()).kind(), FailureKind::Configuration);
        assert_eq!(
            GcnError::UnsupportedDocument("a.docx".into()).kind(),
            FailureKind::Unclassified
        );
    }
}
