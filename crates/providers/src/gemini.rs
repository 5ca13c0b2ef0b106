//! Google Gemini provider implementation.
//!
//! Uses the `generateContent` REST endpoint (not the streaming variant).
//!
//! Notes on the wire format:
//! - API key is passed as a `key` query parameter, not a header
//! - The prompt goes in `contents[].parts[].text`
//! - Sampling knobs live under `generationConfig`
//! - Safety blocks show up as a `promptFeedback.blockReason` or as a
//!   candidate with no parts

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use tutoragent_core::provider::CompletionRequest;
use tutoragent_core::{Provider, ProviderError};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
const TOP_P: f32 = 0.8;
const TOP_K: u32 = 40;

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: "gemini".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            client,
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [{"text": request.prompt}]
            }],
            "generationConfig": {
                "temperature": request.temperature,
                "topP": TOP_P,
                "topK": TOP_K,
                "maxOutputTokens": request.max_output_tokens,
            },
        })
    }

    /// Pull the generated text out of the response, flagging safety blocks.
    fn extract_text(resp: GeminiResponse) -> Result<String, ProviderError> {
        if let Some(feedback) = &resp.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(ProviderError::ContentFiltered(format!(
                    "prompt blocked: {reason}"
                )));
            }
        }

        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ContentFiltered("no candidates returned".into()))?;

        let text: String = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "empty response".into());
            return Err(ProviderError::ContentFiltered(reason));
        }

        Ok(text)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = self.build_body(&request);

        debug!(provider = "gemini", model = %self.model, "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout("Gemini request timed out".into())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid Gemini API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Gemini API error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: GeminiResponse =
            response.json().await.map_err(|e| ProviderError::ApiError {
                status_code: 200,
                message: format!("Failed to parse Gemini response: {e}"),
            })?;

        Self::extract_text(api_resp)
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let request = CompletionRequest::new("ping");
        let mut body = self.build_body(&request);
        body["generationConfig"]["maxOutputTokens"] = serde_json::json!(1);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        // 200 = works; 400 means reachable but the probe body was rejected,
        // which still proves the key and endpoint are fine
        let status = response.status().as_u16();
        Ok(status == 200 || status == 400)
    }
}

// --- Gemini API types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
