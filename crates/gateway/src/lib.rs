//! HTTP gateway for RouteChat.
//!
//! Serves the single-page chat UI and the JSON API it talks to.
//!
//! Built on Axum.

pub mod api_v1;
pub mod frontend;

use axum::{Router, response::Json, routing::get};
use routechat_config::AppConfig;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub use api_v1::{ApiV1State, GraphFactory, SharedApiState};

/// Build the full router: health check, v1 API, and the embedded page.
pub fn build_router(api_state: SharedApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api_v1::v1_router(api_state))
        .merge(frontend::frontend_router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// A missing completion credential does not stop startup; the first
/// message reports it instead.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    if !config.has_api_key() {
        info!("No completion API key configured yet; set one in the settings panel");
    }

    let state = Arc::new(ApiV1State::from_config(config)?);
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
