//! Text-generation seam.

use async_trait::async_trait;
use serde_json::Value;

/// One structured generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Schema the JSON response must follow.
    pub response_schema: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// No API key configured.
    #[error("AI backend is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("AI backend error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("AI backend returned no candidates")]
    EmptyResponse,

    #[error("AI backend returned malformed output: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Generate a JSON value following `request.response_schema`.
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, AiError>;
}

/// Stand-in used when no backend is configured. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl TextGenerator for UnconfiguredGenerator {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<Value, AiError> {
        Err(AiError::NotConfigured)
    }
}
