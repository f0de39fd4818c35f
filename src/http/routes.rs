//! HTTP route definitions

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    response::Json,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::app::AppState;
use crate::server::ServerStats;
use crate::util::time::{started_at, uptime_secs};
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors_layer(&state.config.client_origin)),
        )
        .with_state(state)
}

/// CORS configuration - supports multiple origins (comma-separated)
fn cors_layer(client_origin: &str) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    started_at: Option<DateTime<Utc>>,
    connections: usize,
    #[serde(flatten)]
    stats: ServerStats,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = *state.stats.read();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        started_at: started_at(),
        connections: state.hub.len(),
        stats,
    })
}
