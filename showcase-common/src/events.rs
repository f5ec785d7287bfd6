//! View count events
//!
//! Published whenever the authoritative counter for a video changes, so every
//! place that displays that count (gallery grid, open player, SSE clients)
//! can refresh without reloading the catalog.

use serde::{Deserialize, Serialize};

/// Authoritative view count for one video after a newly counted view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCountUpdate {
    pub video_id: String,
    pub view_count: i64,
}

impl ViewCountUpdate {
    pub fn new(video_id: impl Into<String>, view_count: i64) -> Self {
        Self {
            video_id: video_id.into(),
            view_count,
        }
    }

    /// SSE event name used on the wire
    pub fn event_name(&self) -> &'static str {
        "view_count"
    }
}
