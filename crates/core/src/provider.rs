//! Provider trait — the abstraction over LLM backends.
//!
//! A Provider takes one text prompt and returns one text completion.
//! There is no streaming and no native multi-turn context: every call is
//! self-contained, with whatever history matters embedded in the prompt
//! by the caller.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Configuration for a single completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The full prompt text.
    pub prompt: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

impl CompletionRequest {
    /// A request with the default generation settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// The core Provider trait.
///
/// Every LLM backend implements this trait. The tutoring layer calls
/// `complete()` without knowing which provider is being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and get the completion text back.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<String, ProviderError>;

    /// Cheap reachability probe for health endpoints.
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let req = CompletionRequest::new("hello");
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_output_tokens, 2048);
    }

    #[test]
    fn request_defaults_apply_on_deserialize() {
        let req: CompletionRequest = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(req.temperature, 0.7);
        assert_eq!(req.max_output_tokens, 2048);
    }
}
