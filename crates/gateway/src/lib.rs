//! HTTP API gateway for TutorAgent.
//!
//! Exposes the chat and PDF-chat tutoring endpoints plus health checks.
//! Built on Axum. All JSON errors carry a `detail` string.

pub mod chat;
pub mod error;
pub mod pdf_chat;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::{Router, extract::State, response::Json, routing::get};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use tutoragent_config::{AppConfig, UploadConfig};
use tutoragent_core::Provider;
use tutoragent_store::SessionStore;
use tutoragent_tutor::{PdfSessionTracker, SessionTracker, TutorAgent};

/// Shared application state. Every handle is injected once at startup;
/// handlers never construct clients of their own.
pub struct AppState {
    pub agent: TutorAgent,
    pub provider: Arc<dyn Provider>,
    pub store: Arc<dyn SessionStore>,
    pub chat_tracker: SessionTracker,
    pub pdf_tracker: PdfSessionTracker,
    pub upload: UploadConfig,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wire up the state from a config plus already-built handles.
    pub fn build(
        config: &AppConfig,
        provider: Arc<dyn Provider>,
        store: Arc<dyn SessionStore>,
    ) -> SharedState {
        let agent = TutorAgent::new(provider.clone())
            .with_generation(config.temperature, config.max_output_tokens);
        let chat_tracker = SessionTracker::new(
            store.clone(),
            Duration::from_secs(config.session.chat_ttl_secs),
        );
        let pdf_tracker = PdfSessionTracker::new(
            store.clone(),
            Duration::from_secs(config.session.pdf_ttl_secs),
        );

        Arc::new(AppState {
            agent,
            provider,
            store,
            chat_tracker,
            pdf_tracker,
            upload: config.upload.clone(),
            start_time: chrono::Utc::now(),
        })
    }
}

/// Build the full Axum router.
pub fn build_router(state: SharedState, config: &AppConfig) -> Router {
    let cors = cors_layer(&config.gateway.cors_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .nest("/api/v1/chat", chat::router())
        .nest("/api/v1/pdf-chat", pdf_chat::router())
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.upload.max_file_size + 64 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// CORS from the configured allow-list; an empty list allows any origin,
/// matching the development posture of the service.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if origins.is_empty() {
        return cors.allow_origin(AllowOrigin::any());
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(parsed))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let provider = tutoragent_providers::build_from_config(&config)?;
    let store = tutoragent_store::build_from_config(&config).await?;

    info!(
        provider = provider.name(),
        store = store.name(),
        "Subsystems initialized"
    );

    let state = AppState::build(&config, provider, store);
    let router = build_router(state, &config);

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("TutorAgent gateway listening on http://{addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl-C handler");
        return;
    }
    info!("Shutdown signal received");
}

// ── Health ────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let store_ok = state.store.ping().await.is_ok();
    let llm_ok = state.provider.health_check().await.unwrap_or(false);

    let status = if store_ok && llm_ok { "ok" } else { "degraded" };
    let uptime_secs = (chrono::Utc::now() - state.start_time).num_seconds();

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime_secs,
        "services": {
            "store": if store_ok { "ok" } else { "error" },
            "llm": if llm_ok { "ok" } else { "error" },
        },
    }))
}

async fn liveness_handler() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

async fn readiness_handler(
    State(state): State<SharedState>,
) -> Result<Json<serde_json::Value>, error::ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| error::ApiError::service_unavailable(format!("store unreachable: {e}")))?;
    Ok(Json(json!({"status": "ready"})))
}
