//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{GenerationError, GenerativeModel};
use crate::config::ModelConfig;

/// Gemini model called over the public REST API.
pub struct GeminiModel {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl std::fmt::Debug for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiModel")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl GeminiModel {
    pub fn from_config(config: &ModelConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.name.clone(),
            api_key: config.resolve_api_key(),
            api_key_env: config.api_key_env.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(prompt: &str) -> Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{ "text": prompt }]
                }
            ]
        })
    }

    /// Concatenate the text parts of the first candidate.
    fn parse_response(body: &Value) -> Result<String, GenerationError> {
        let candidates = body["candidates"]
            .as_array()
            .ok_or_else(|| GenerationError::Malformed("missing 'candidates' array".to_string()))?;

        let candidate = candidates
            .first()
            .ok_or_else(|| GenerationError::Malformed("empty 'candidates' array".to_string()))?;

        let parts = candidate["content"]["parts"].as_array().ok_or_else(|| {
            let reason = candidate["finishReason"].as_str().unwrap_or("unknown");
            GenerationError::Malformed(format!("candidate has no content (finish reason: {reason})"))
        })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();

        Ok(text)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GenerationError::MissingApiKey {
                env_var: self.api_key_env.clone(),
            })?;

        let url = self.endpoint_url();
        tracing::debug!(
            target: "llm",
            "sending generateContent to {url} ({} prompt chars)",
            prompt.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&Self::request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(target: "llm", "model call failed with HTTP {status}");
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body: Value = serde_json::from_str(&body_text)
            .map_err(|e| GenerationError::Malformed(format!("invalid JSON: {e}")))?;

        Self::parse_response(&body)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> GeminiModel {
        GeminiModel::from_config(&ModelConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            name: "gemini-test".to_string(),
            api_key: Some("k".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            model().endpoint_url(),
            "https://example.test/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GeminiModel::request_body("What is this?");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "What is this?");
    }

    #[test]
    fn test_parse_text_response() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "The answer " }, { "text": "is 42." }]
                },
                "finishReason": "STOP"
            }]
        });
        assert_eq!(GeminiModel::parse_response(&body).unwrap(), "The answer is 42.");
    }

    #[test]
    fn test_parse_missing_candidates() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert!(matches!(
            GeminiModel::parse_response(&body),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_empty_candidates() {
        let body = json!({ "candidates": [] });
        let err = GeminiModel::parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_blocked_candidate() {
        let body = json!({ "candidates": [{ "finishReason": "SAFETY" }] });
        let err = GeminiModel::parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let model = GeminiModel::from_config(&ModelConfig {
            api_key_env: "PDFQA_TEST_NO_SUCH_KEY".to_string(),
            ..Default::default()
        })
        .unwrap();

        let err = model.generate("hi").await.unwrap_err();
        assert!(
            matches!(err, GenerationError::MissingApiKey { ref env_var } if env_var == "PDFQA_TEST_NO_SUCH_KEY")
        );
    }
}
