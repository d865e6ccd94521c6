//! Storage errors and the structured error body surfaced to API callers.

use serde::Serialize;
use thiserror::Error;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Structured error payload for callers: a stable machine-readable code, a
/// human-readable message, and arbitrary extra context (limit, current value,
/// entitlement key, ...). Codes are stable identifiers callers may branch on.
#[derive(Clone, Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(flatten)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: serde_json::Map::new(),
        }
    }

    /// Attach one context field.
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }
}
