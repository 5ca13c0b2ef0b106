//! LLM provider implementations.
//!
//! Everything here implements the [`tutoragent_core::Provider`] trait, so the
//! tutoring layer never knows which backend it is talking to.

pub mod gemini;

pub use gemini::GeminiProvider;

use std::sync::Arc;
use tutoragent_config::AppConfig;
use tutoragent_core::{Provider, ProviderError};

/// Build the configured provider.
///
/// Fails early if no API key is available so misconfiguration surfaces at
/// startup rather than on the first student message.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or(ProviderError::NotConfigured(
            "no API key set; export GEMINI_API_KEY or add api_key to the config file".into(),
        ))?;

    Ok(Arc::new(
        GeminiProvider::new(api_key).with_model(config.model.clone()),
    ))
}
