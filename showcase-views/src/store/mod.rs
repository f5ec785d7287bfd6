//! Remote counter store
//!
//! The store is the single authority on view counts and on deduplication.
//! Clients only ever talk to it through [`ViewStore`], and only through the
//! degrading helpers below for listing and counting.

use async_trait::async_trait;
use showcase_common::db::models::{Video, ViewRecordRequest};
use tracing::error;

use crate::error::Result;

pub mod http;
pub mod memory;
pub mod sqlite;

pub use http::HttpViewStore;
pub use memory::MemoryViewStore;
pub use sqlite::SqliteViewStore;

/// Narrow RPC-like interface to the authoritative counter store
#[async_trait]
pub trait ViewStore: Send + Sync {
    /// All videos, newest first by creation time
    async fn list_videos(&self) -> Result<Vec<Video>>;

    /// Assert a view fact
    ///
    /// Idempotent per `(video_id, session_id)`: returns `true` only when this
    /// call newly incremented the counter.
    async fn record_view(&self, request: &ViewRecordRequest) -> Result<bool>;

    /// Current authoritative count for one video
    async fn view_count(&self, video_id: &str) -> Result<i64>;
}

/// List videos, logging failures and returning an empty catalog instead
pub async fn list_videos_or_empty(store: &dyn ViewStore) -> Vec<Video> {
    match store.list_videos().await {
        Ok(videos) => videos,
        Err(e) => {
            error!("Error fetching videos: {}", e);
            Vec::new()
        }
    }
}

/// Fetch a view count, logging failures and returning 0 instead
pub async fn view_count_or_zero(store: &dyn ViewStore, video_id: &str) -> i64 {
    match store.view_count(video_id).await {
        Ok(count) => count,
        Err(e) => {
            error!("Error fetching view count for {}: {}", video_id, e);
            0
        }
    }
}
