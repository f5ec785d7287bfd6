//! Gallery cache
//!
//! The client's read-only copy of the catalog for one page load. View counts
//! in it are advisory: they only move up, either from a newly counted view
//! published on the [`ViewCountBus`] or from a full refresh.
//!
//! [`ViewCountBus`]: crate::events::ViewCountBus

use showcase_common::db::models::Video;
use showcase_common::ViewCountUpdate;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::store::{list_videos_or_empty, ViewStore};

/// Videos per gallery page (2x2 grid)
pub const PAGE_SIZE: usize = 4;

/// Cached catalog for one page load
#[derive(Debug, Clone, Default)]
pub struct VideoGallery {
    videos: Vec<Video>,
}

impl VideoGallery {
    pub fn new(videos: Vec<Video>) -> Self {
        Self { videos }
    }

    /// Load the catalog; an unreachable store yields an empty gallery
    pub async fn load(store: &dyn ViewStore) -> Self {
        Self::new(list_videos_or_empty(store).await)
    }

    /// Reload after the player closes, keeping whichever count is higher
    ///
    /// A failed reload keeps the current cache instead of emptying the grid.
    pub async fn refresh(&mut self, store: &dyn ViewStore) {
        let mut fresh = list_videos_or_empty(store).await;
        if fresh.is_empty() && !self.videos.is_empty() {
            debug!("Refresh returned nothing; keeping cached catalog");
            return;
        }
        for video in &mut fresh {
            if let Some(cached) = self.get(&video.id) {
                video.view_count = video.view_count.max(cached.view_count);
            }
        }
        self.videos = fresh;
    }

    /// Apply an authoritative count; returns whether the displayed count changed
    pub fn apply(&mut self, update: &ViewCountUpdate) -> bool {
        match self.videos.iter_mut().find(|v| v.id == update.video_id) {
            Some(video) if update.view_count > video.view_count => {
                video.view_count = update.view_count;
                true
            }
            Some(_) => false,
            None => {
                debug!("Count update for {} not in gallery", update.video_id);
                false
            }
        }
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn get(&self, video_id: &str) -> Option<&Video> {
        self.videos.iter().find(|v| v.id == video_id)
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Split into grid pages of `size` videos (last page may be short)
    pub fn pages(&self, size: usize) -> Vec<&[Video]> {
        self.videos.chunks(size.max(1)).collect()
    }
}

/// Keep a shared gallery in sync with published counts until the bus closes
pub async fn follow_updates(
    gallery: Arc<RwLock<VideoGallery>>,
    mut updates: broadcast::Receiver<ViewCountUpdate>,
) {
    loop {
        match updates.recv().await {
            Ok(update) => {
                gallery.write().await.apply(&update);
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Gallery missed {} count updates", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Compact view count for thumbnails: `999`, `1.2K`, `3M`
pub fn format_view_count(count: i64) -> String {
    fn compact(value: f64, suffix: &str) -> String {
        let formatted = format!("{:.1}", value);
        let trimmed = formatted.strip_suffix(".0").unwrap_or(&formatted);
        format!("{}{}", trimmed, suffix)
    }

    if count >= 1_000_000 {
        compact(count as f64 / 1_000_000.0, "M")
    } else if count >= 1_000 {
        compact(count as f64 / 1_000.0, "K")
    } else {
        count.to_string()
    }
}
