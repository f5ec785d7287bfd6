//! Liveness plus a catalog probe of the counter store

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the store cannot be read
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    /// Catalog size, absent when the store is unreadable
    pub videos: Option<usize>,
}

/// GET /health
///
/// Always 200 so a load balancer can tell "process up" from "store down".
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let videos = match state.store.list_videos().await {
        Ok(videos) => Some(videos.len()),
        Err(e) => {
            warn!("Health check could not read catalog: {}", e);
            None
        }
    };

    Json(HealthResponse {
        status: if videos.is_some() { "ok" } else { "degraded" },
        module: "showcase-views",
        version: env!("CARGO_PKG_VERSION"),
        videos,
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
