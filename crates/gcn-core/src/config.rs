use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GcnError, Result};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(skip_serializing)]
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Url,
    pub request_timeout_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// A missing credential is a configuration failure: nothing can be processed
    /// without it, so callers should stop before accepting any documents.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("GOOGLE_API_KEY"))
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                GcnError::Config(
                    "GEMINI_API_KEY is not set; provide it in the environment".to_string(),
                )
            })?;

        let base_url_raw = lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let gemini_base_url = Url::parse(&base_url_raw)
            .map_err(|e| GcnError::Config(format!("invalid GEMINI_BASE_URL '{base_url_raw}': {e}")))?;

        Ok(Self {
            gemini_api_key,
            gemini_model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.into()),
            gemini_base_url,
            request_timeout_secs: parse_or(&lookup, "GEMINI_TIMEOUT_SECS", 300)?,
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port: parse_or(&lookup, "SERVER_PORT", 8080)?,
            max_upload_bytes: parse_or::<usize, _>(&lookup, "GCN_MAX_UPLOAD_MB", 50)? * 1024 * 1024,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| GcnError::Config(format!("invalid {key} '{raw}': {e}"))),
    }
}
