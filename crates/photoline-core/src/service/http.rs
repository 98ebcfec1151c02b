//! Webhook HTTP surface: a single callback endpoint plus the keep-alive and
//! health probes.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::channel::MessagingApi;
use crate::config::Config;
use crate::event;
use crate::router::EventRouter;
use crate::signature;

/// Shared application state for the HTTP layer.
pub struct AppState {
    pub config: Config,
    pub router: EventRouter,
    pub api: Arc<dyn MessagingApi>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Create the axum Router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Keep-alive ping target
        .route("/", get(handle_root))
        // Webhook
        .route("/callback", post(handle_callback))
        // Health
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_root() -> impl IntoResponse {
    "photoline"
}

async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// POST /callback — LINE webhook.
async fn handle_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let signature = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    process_webhook(&state, signature, &body).await
}

/// Verify, parse, route, reply. Split from the axum handler so tests can
/// drive it without a socket.
///
/// A bad signature rejects the request before the body is ever parsed;
/// nothing downstream runs.
pub async fn process_webhook(
    state: &AppState,
    signature: &str,
    body: &str,
) -> (StatusCode, &'static str) {
    if !signature::verify(body.as_bytes(), signature, &state.config.channel_secret) {
        info!("Webhook rejected: invalid signature");
        return (StatusCode::BAD_REQUEST, "invalid signature");
    }

    let events = match event::parse_webhook(body) {
        Ok(events) => events,
        Err(e) => {
            error!("Failed to parse webhook payload: {}", e);
            return (StatusCode::BAD_REQUEST, "malformed payload");
        }
    };

    info!("Webhook accepted: {} event(s)", events.len());
    let replies = state.router.route(events).await;

    for reply in &replies {
        if let Err(e) = state.api.reply(&reply.reply_token, &reply.message).await {
            error!("Failed to send reply: {}", e);
        }
    }

    (StatusCode::OK, "OK")
}

/// Start the HTTP server on the given address.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
