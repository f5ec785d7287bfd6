//! HTTP API handlers for showcase-views

pub mod buildinfo;
pub mod error;
pub mod health;
pub mod sse;
pub mod types;
pub mod videos;

pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use health::health_routes;
pub use sse::event_stream;
pub use videos::{get_view_count, list_videos, record_view};
