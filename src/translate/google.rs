//! Google Translate `gtx` client.
//! Single GET per translation; no retry and no rate limiting. The response is a
//! nested JSON array: `[[[fragment, original, ...], ...], null, "src", ...]`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ProviderTranslation, TranslateError, TranslationProvider};
use crate::config::GoogleConfig;

const TRANSLATE_PATH: &str = "/translate_a/single";

/// Google `translate_a/single` client with a pooled reqwest connection.
#[derive(Debug, Clone)]
pub struct GoogleTranslateClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateClient {
    pub fn new(config: &GoogleConfig) -> Result<Self, TranslateError> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout())
            .timeout(config.timeout())
            .build()
            .map_err(|e| TranslateError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<ProviderTranslation, TranslateError> {
        if text.is_empty() {
            return Err(TranslateError::InvalidInput("text is empty".into()));
        }

        let response = self
            .http
            .get(format!("{}{}", self.base_url, TRANSLATE_PATH))
            .query(&[
                ("client", "gtx"),
                ("sl", source_language),
                ("tl", target_language),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "translation endpoint returned error status");
            return Err(TranslateError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let data: Value = serde_json::from_str(&body)
            .map_err(|e| TranslateError::Malformed(format!("body is not JSON: {e}")))?;
        let result = parse_response(&data)?;
        debug!(
            chars = result.translated_text.chars().count(),
            detected = ?result.detected_source_language,
            "gtx response parsed"
        );
        Ok(result)
    }
}

/// Decode a `gtx` payload.
///
/// Element 0 must be an array of segments, none of them null; each segment
/// contributes its first field when that is a non-empty string. Element 2, if a non-empty
/// string, is the detected source language.
pub fn parse_response(data: &Value) -> Result<ProviderTranslation, TranslateError> {
    let top = data
        .as_array()
        .ok_or_else(|| TranslateError::Malformed("payload is not an array".into()))?;
    let segments = top
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| TranslateError::Malformed("missing translation segments".into()))?;

    if segments.iter().any(Value::is_null) {
        return Err(TranslateError::Malformed("null segment".into()));
    }
    let translated_text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .filter(|fragment| !fragment.is_empty())
        .collect();

    let detected_source_language = top
        .get(2)
        .and_then(Value::as_str)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string);

    Ok(ProviderTranslation {
        translated_text,
        detected_source_language,
    })
}
