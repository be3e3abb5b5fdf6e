//! Per-key translation record: Pending → Success | Failed.

use serde::{Deserialize, Serialize};

use super::ProviderTranslation;

/// Message stored when a failure carries no description of its own.
pub const GENERIC_FAILURE: &str = "Translation failed. Please try again.";

/// Lifecycle stage of a cached translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for TranslationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationStatus::Pending => write!(f, "Pending"),
            TranslationStatus::Success => write!(f, "Success"),
            TranslationStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Current state of one entity's translation.
///
/// Built only through [`TranslationRecord::pending`], [`TranslationRecord::success`]
/// and [`TranslationRecord::failed`], so `error_message` is set exactly when the
/// status is `Failed` and `source_language` only on `Success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    translated_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_language: Option<String>,
    target_language: String,
    status: TranslationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
}

impl TranslationRecord {
    pub fn pending(target_language: impl Into<String>) -> Self {
        Self {
            translated_text: String::new(),
            source_language: None,
            target_language: target_language.into(),
            status: TranslationStatus::Pending,
            error_message: None,
        }
    }

    pub fn success(target_language: impl Into<String>, result: ProviderTranslation) -> Self {
        Self {
            translated_text: result.translated_text,
            source_language: result.detected_source_language,
            target_language: target_language.into(),
            status: TranslationStatus::Success,
            error_message: None,
        }
    }

    /// An empty `message` is replaced with [`GENERIC_FAILURE`].
    pub fn failed(target_language: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            GENERIC_FAILURE.to_string()
        } else {
            message
        };
        Self {
            translated_text: String::new(),
            source_language: None,
            target_language: target_language.into(),
            status: TranslationStatus::Failed,
            error_message: Some(message),
        }
    }

    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    pub fn source_language(&self) -> Option<&str> {
        self.source_language.as_deref()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn status(&self) -> TranslationStatus {
        self.status
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Success with non-empty text.
    pub fn is_complete(&self) -> bool {
        self.status == TranslationStatus::Success && !self.translated_text.is_empty()
    }
}
