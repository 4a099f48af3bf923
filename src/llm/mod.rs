//! External text-generation models.
//!
//! The answering pipeline only sees the [`GenerativeModel`] trait: one prompt
//! in, one completion out, no streaming and no retries. A failed call is
//! reported once as a [`GenerationError`].

pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::ModelConfig;

pub use gemini::GeminiModel;

/// Failure of a single model call.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key configured (set {env_var} or model.api_key)")]
    MissingApiKey { env_var: String },

    #[error("Request to model failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    Malformed(String),
}

/// A hosted model that turns a prompt into text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Send `prompt` and return the raw completion text.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Identifier of the underlying model, for logs.
    fn model_name(&self) -> &str;
}

/// Errors building a model from configuration.
#[derive(Error, Debug)]
pub enum ModelConfigError {
    #[error("Unsupported model provider '{0}'. Supported: gemini")]
    UnsupportedProvider(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Build the configured model.
///
/// A missing API key is not fatal here; calls fail with
/// [`GenerationError::MissingApiKey`] until one is provided.
pub fn from_config(config: &ModelConfig) -> Result<Arc<dyn GenerativeModel>, ModelConfigError> {
    match config.provider.as_str() {
        "gemini" => {
            let model = GeminiModel::from_config(config)?;
            if !model.has_api_key() {
                tracing::warn!(
                    target: "llm",
                    "no API key found in {}; model calls will fail",
                    config.api_key_env
                );
            }
            Ok(Arc::new(model))
        }
        other => Err(ModelConfigError::UnsupportedProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ModelConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        let result = from_config(&config);
        assert!(matches!(result, Err(ModelConfigError::UnsupportedProvider(p)) if p == "carrier-pigeon"));
    }

    #[test]
    fn test_gemini_builds_without_key() {
        let config = ModelConfig {
            api_key_env: "PDFQA_TEST_NO_SUCH_KEY".to_string(),
            ..Default::default()
        };
        let model = from_config(&config).unwrap();
        assert_eq!(model.model_name(), "gemini-1.5-flash");
    }
}
