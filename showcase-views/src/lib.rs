//! showcase-views library - video view counting
//!
//! Two halves share this crate:
//! - the counter service (`api`, `store::SqliteViewStore`), which owns the
//!   authoritative counts and deduplicates per `(video, session)`
//! - the client-side tracker (`player`, `tracker`, `recorder`, `gallery`),
//!   which decides when a view qualifies and reports it exactly once

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod events;
pub mod gallery;
pub mod likes;
pub mod player;
pub mod recorder;
pub mod schedule;
pub mod session_id;
pub mod storage;
pub mod store;
pub mod tracker;

pub use error::{Error, Result};
pub use events::ViewCountBus;
pub use player::{PlayerContext, PlayerSession, ViewState};
pub use store::{HttpViewStore, MemoryViewStore, SqliteViewStore, ViewStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Authoritative counter store (SQLite in production)
    pub store: Arc<dyn ViewStore>,
    /// Live count updates for `/events` subscribers
    pub bus: ViewCountBus,
}

impl AppState {
    pub fn new(store: Arc<dyn ViewStore>, bus: ViewCountBus) -> Self {
        Self { store, bus }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/videos", get(api::list_videos))
        .route("/api/videos/:id/views", post(api::record_view))
        .route("/api/videos/:id/view_count", get(api::get_view_count))
        .route("/events", get(api::event_stream))
        .route("/build_info", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
