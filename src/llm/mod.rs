//! Generative text endpoint.

mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("generative endpoint is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("api error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("unexpected response: {0}")]
    ParseError(String),
}

/// Shape of the completion the caller wants back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Text,
    Json,
}

#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// False when no API key is available; callers fall back without a request.
    fn is_configured(&self) -> bool {
        true
    }

    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String, LlmError>;
}
