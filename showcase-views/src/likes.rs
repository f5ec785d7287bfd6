//! Cosmetic like state
//!
//! Purely local and deliberately unrelated to view counting: no remote
//! store, no dedup, no consistency guarantee. A lost or corrupt entry just
//! shows the heart as unliked.

use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;
use crate::storage::KeyValueStorage;

/// Storage key holding the JSON array of liked video ids
pub const LIKED_VIDEOS_KEY: &str = "likedVideos";

/// Liked videos kept in persistent client storage
#[derive(Clone)]
pub struct LikeBook {
    storage: Arc<dyn KeyValueStorage>,
}

impl LikeBook {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    fn liked(&self) -> BTreeSet<String> {
        let Some(raw) = self.storage.get(LIKED_VIDEOS_KEY) else {
            return BTreeSet::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Discarding unreadable like list: {}", e);
            BTreeSet::new()
        })
    }

    fn save(&self, liked: &BTreeSet<String>) -> Result<()> {
        let json = serde_json::to_string(liked).unwrap_or_else(|_| "[]".to_string());
        self.storage.set(LIKED_VIDEOS_KEY, &json)
    }

    pub fn is_liked(&self, video_id: &str) -> bool {
        self.liked().contains(video_id)
    }

    /// Flip the like state; returns the new state
    pub fn toggle(&self, video_id: &str) -> Result<bool> {
        let mut liked = self.liked();
        let now_liked = if liked.remove(video_id) {
            false
        } else {
            liked.insert(video_id.to_string());
            true
        };
        self.save(&liked)?;
        Ok(now_liked)
    }

    /// Like without ever unliking (double-tap on the video)
    pub fn like(&self, video_id: &str) -> Result<()> {
        let mut liked = self.liked();
        if liked.insert(video_id.to_string()) {
            self.save(&liked)?;
        }
        Ok(())
    }

    /// Like count shown on the card: a stable per-video base plus our own like
    pub fn display_likes(&self, video_id: &str) -> i64 {
        base_like_count(video_id) + i64::from(self.is_liked(video_id))
    }
}

/// Stable pseudo like count in `1000..51000` derived from the video id
pub fn base_like_count(video_id: &str) -> i64 {
    let hash = video_id
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
        });
    i64::from(hash % 50_000).abs() + 1_000
}
