//! Translation module: provider contract, per-key cache, Google `gtx` client.
//! The cache only sees the `TranslationProvider` trait; concrete backends live
//! in submodules.

pub mod cache;
pub mod google;
pub mod record;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Source-language sentinel asking the provider to detect the language.
pub const AUTO_DETECT: &str = "auto";

/// Successful provider response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderTranslation {
    pub translated_text: String,
    pub detected_source_language: Option<String>,
}

/// Translator trait (adapter for different backends).
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target_language: &str,
        source_language: &str,
    ) -> Result<ProviderTranslation, TranslateError>;
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Transport(String),
    #[error("translation timeout")]
    Timeout,
    #[error("Translation failed: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("Invalid translation response: {0}")]
    Malformed(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Transport(e.to_string())
        }
    }
}
