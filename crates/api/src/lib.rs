//! HTTP and WebSocket surface for the PropertyPulse dashboard.

pub mod error;
pub mod handlers;
pub mod websocket;

use std::path::Path;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use pulse_core::analysis::Assumptions;
use pulse_core::config::Settings;
use pulse_core::storage::Repositories;

use crate::websocket::WebSocketState;

pub struct AppState {
    pub repos: Repositories,
    pub assumptions: Assumptions,
    pub ws: WebSocketState,
    /// Serializes read-modify-write of pipelines.
    pipeline_lock: Mutex<()>,
}

impl AppState {
    pub fn new(repos: Repositories, assumptions: Assumptions, ws_capacity: usize) -> Self {
        Self {
            repos,
            assumptions,
            ws: WebSocketState::new(ws_capacity),
            pipeline_lock: Mutex::new(()),
        }
    }

    pub fn from_settings(repos: Repositories, settings: &Settings) -> Self {
        Self::new(repos, settings.assumptions(), settings.ws_broadcast_capacity)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route(
            "/api/properties",
            get(handlers::list_properties).post(handlers::upsert_property),
        )
        .route("/api/properties/:id", get(handlers::get_property))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/pipeline/:user_id", get(handlers::get_pipeline))
        .route("/api/pipeline/:user_id/add", post(handlers::add_deal))
        .route("/api/pipeline/:user_id/move", post(handlers::move_deal))
        .route("/api/market/:location", get(handlers::get_market))
        .route("/ws", get(websocket::ws_handler))
        .route("/api/ws/status", get(websocket::ws_status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the dashboard's static files for any unmatched path, falling back to `index.html`.
pub fn with_static_dir(router: Router, dir: impl AsRef<Path>) -> Router {
    let dir = dir.as_ref();
    let index = ServeFile::new(dir.join("index.html"));
    router.fallback_service(ServeDir::new(dir).not_found_service(index))
}
