//! In-process store with the same dedup semantics as the SQLite store
//!
//! Supports failure injection and call inspection.

use async_trait::async_trait;
use showcase_common::db::models::{Video, ViewRecordRequest};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::ViewStore;
use crate::error::{Error, Result};

#[derive(Default)]
struct MemoryState {
    videos: Vec<Video>,
    counted: HashSet<(String, String)>,
    record_calls: Vec<ViewRecordRequest>,
    failing: bool,
    view_count_failing: bool,
}

/// Thread-safe in-memory [`ViewStore`]
#[derive(Default)]
pub struct MemoryViewStore {
    state: Mutex<MemoryState>,
}

impl MemoryViewStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a video to the catalog (newest is whichever has the latest `created_at`)
    pub fn insert_video(&self, video: Video) {
        let mut state = self.state();
        state.videos.retain(|v| v.id != video.id);
        state.videos.push(video);
    }

    /// Make every subsequent call fail with [`Error::Unavailable`]
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Make only `view_count` fail, leaving recording intact
    pub fn set_view_count_failing(&self, failing: bool) {
        self.state().view_count_failing = failing;
    }

    /// Every `record_view` request received, in order (including failed ones)
    pub fn record_calls(&self) -> Vec<ViewRecordRequest> {
        self.state().record_calls.clone()
    }

    fn check_available(state: &MemoryState) -> Result<()> {
        if state.failing {
            Err(Error::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ViewStore for MemoryViewStore {
    async fn list_videos(&self) -> Result<Vec<Video>> {
        let state = self.state();
        Self::check_available(&state)?;
        let mut videos = state.videos.clone();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(videos)
    }

    async fn record_view(&self, request: &ViewRecordRequest) -> Result<bool> {
        let mut state = self.state();
        state.record_calls.push(request.clone());
        Self::check_available(&state)?;

        if request.session_id.is_empty() {
            return Err(Error::InvalidInput("session_id must not be empty".to_string()));
        }

        let key = (request.video_id.clone(), request.session_id.clone());
        let MemoryState { videos, counted, .. } = &mut *state;
        let video = videos
            .iter_mut()
            .find(|v| v.id == request.video_id)
            .ok_or_else(|| Error::NotFound(format!("video {}", request.video_id)))?;

        if !counted.insert(key) {
            return Ok(false);
        }
        video.view_count += 1;
        Ok(true)
    }

    async fn view_count(&self, video_id: &str) -> Result<i64> {
        let state = self.state();
        Self::check_available(&state)?;
        if state.view_count_failing {
            return Err(Error::Unavailable("injected view_count failure".to_string()));
        }
        state
            .videos
            .iter()
            .find(|v| v.id == video_id)
            .map(|v| v.view_count)
            .ok_or_else(|| Error::NotFound(format!("video {}", video_id)))
    }
}

/// Minimal catalog entry for unit tests
#[cfg(test)]
pub(crate) fn sample_video(id: &str) -> Video {
    use chrono::Utc;

    Video {
        id: id.to_string(),
        title: format!("Video {}", id),
        description: None,
        thumbnail_url: format!("/{}.png", id),
        video_url: format!("https://cdn.example.com/{}.mp4", id),
        view_count: 0,
        duration_seconds: 30,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_twice_yields_true_then_false() {
        let store = MemoryViewStore::new();
        store.insert_video(sample_video("v1"));
        let req = ViewRecordRequest::new("v1", "sid", 3.0);

        assert!(store.record_view(&req).await.unwrap());
        assert!(!store.record_view(&req).await.unwrap());
        assert_eq!(store.view_count("v1").await.unwrap(), 1);
        assert_eq!(store.record_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryViewStore::new();
        store.insert_video(sample_video("v1"));
        store.set_failing(true);

        let req = ViewRecordRequest::new("v1", "sid", 3.0);
        assert!(matches!(store.record_view(&req).await, Err(Error::Unavailable(_))));

        store.set_failing(false);
        assert!(store.record_view(&req).await.unwrap());
    }
}
