//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerativeClient, LlmError, ResponseFormat};
use crate::config::GeminiConfig;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(cfg: &GeminiConfig) -> Self {
        Self {
            api_key: cfg.api_key.trim().to_string(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

fn first_text(resp: GenerateResponse) -> Option<String> {
    resp.candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn complete(&self, prompt: &str, format: ResponseFormat) -> Result<String, LlmError> {
        if !self.is_configured() {
            return Err(LlmError::NotConfigured);
        }

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: match format {
                ResponseFormat::Json => Some(GenerationConfig {
                    response_mime_type: "application/json",
                }),
                ResponseFormat::Text => None,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::ApiError { status, message });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::ParseError(e.to_string()))?;
        let text = first_text(parsed)
            .ok_or_else(|| LlmError::ParseError("no text in first candidate".into()))?;
        debug!(model = %self.model, chars = text.len(), "gemini completion");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(key: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: key.into(),
            model: "gemini-test".into(),
            base_url: "https://example.invalid/v1beta/".into(),
        }
    }

    #[test]
    fn blank_key_is_not_configured() {
        assert!(!GeminiClient::new(&cfg("  ")).is_configured());
        assert!(GeminiClient::new(&cfg("abc")).is_configured());
    }

    #[test]
    fn endpoint_includes_model() {
        let c = GeminiClient::new(&cfg("abc"));
        assert_eq!(
            c.endpoint(),
            "https://example.invalid/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn request_json_shape() {
        let req = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "oi" }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "oi");
        assert_eq!(v["generationConfig"]["responseMimeType"], "application/json");
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"Frutas"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(first_text(parsed).as_deref(), Some("Frutas"));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(first_text(empty).is_none());
    }

    #[tokio::test]
    async fn unconfigured_client_fails_without_request() {
        let c = GeminiClient::new(&cfg(""));
        let err = c.complete("x", ResponseFormat::Text).await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
    }
}
