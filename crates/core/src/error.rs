//! Error types for the TutorAgent domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; there is no shared
//! umbrella type, callers handle the enum for the seam they talk to.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Completion blocked or empty: {0}")]
    ContentFiltered(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid document for key {key}: {reason}")]
    InvalidDocument { key: String, reason: String },

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn ingest_error_displays_correctly() {
        let err = IngestError::TooLarge {
            size: 20_000_000,
            max: 10_485_760,
        };
        assert!(err.to_string().contains("20000000"));
        assert!(err.to_string().contains("10485760"));
    }

    #[test]
    fn store_error_displays_key() {
        let err = StoreError::InvalidDocument {
            key: "chat_session:abc".into(),
            reason: "not an object".into(),
        };
        assert!(err.to_string().contains("chat_session:abc"));
    }
}
