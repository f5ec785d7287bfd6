//! Authoritative SQLite-backed store

use async_trait::async_trait;
use showcase_common::db::models::{NewVideo, Video, ViewRecordRequest};
use showcase_common::db::videos;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::ViewStore;
use crate::error::{Error, Result};

/// Store used by the HTTP service
///
/// Deduplication is enforced by the `video_views` unique key, so this type
/// holds no state of its own beyond the pool and the watch-time floor.
#[derive(Clone)]
pub struct SqliteViewStore {
    pool: SqlitePool,
    min_watch_seconds: u64,
}

impl SqliteViewStore {
    pub fn new(pool: SqlitePool, min_watch_seconds: u64) -> Self {
        Self {
            pool,
            min_watch_seconds,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn min_watch_seconds(&self) -> u64 {
        self.min_watch_seconds
    }

    /// Insert or refresh catalog entries without touching their counts
    pub async fn seed(&self, catalog: &[NewVideo]) -> Result<()> {
        for video in catalog {
            videos::upsert_video(&self.pool, video)
                .await
                .map_err(|e| Error::from(e).normalize())?;
        }
        if !catalog.is_empty() {
            info!("Seeded {} catalog entries", catalog.len());
        }
        Ok(())
    }
}

#[async_trait]
impl ViewStore for SqliteViewStore {
    async fn list_videos(&self) -> Result<Vec<Video>> {
        videos::list_videos(&self.pool)
            .await
            .map_err(|e| Error::from(e).normalize())
    }

    async fn record_view(&self, request: &ViewRecordRequest) -> Result<bool> {
        if request.session_id.is_empty() {
            return Err(Error::InvalidInput("session_id must not be empty".to_string()));
        }

        if request.watch_duration_seconds < self.min_watch_seconds {
            // Still surface unknown videos as errors, short watches are just "not counted"
            self.view_count(&request.video_id).await?;
            debug!(
                "Ignoring {}s view of {} (minimum {}s)",
                request.watch_duration_seconds, request.video_id, self.min_watch_seconds
            );
            return Ok(false);
        }

        videos::record_view(&self.pool, request)
            .await
            .map_err(|e| Error::from(e).normalize())
    }

    async fn view_count(&self, video_id: &str) -> Result<i64> {
        videos::get_view_count(&self.pool, video_id)
            .await
            .map_err(|e| Error::from(e).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_common::db::init::{init_database, init_memory_database};
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn store_with(ids: &[&str]) -> SqliteViewStore {
        let pool = init_memory_database().await.unwrap();
        seeded(pool, ids).await
    }

    async fn seeded(pool: SqlitePool, ids: &[&str]) -> SqliteViewStore {
        let store = SqliteViewStore::new(pool, 3);
        let catalog: Vec<NewVideo> = ids
            .iter()
            .map(|id| NewVideo {
                id: id.to_string(),
                title: format!("Video {}", id),
                description: None,
                thumbnail_url: format!("/{}.png", id),
                video_url: format!("https://cdn.example.com/{}.mp4", id),
                duration_seconds: 20,
            })
            .collect();
        store.seed(&catalog).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_second_record_is_duplicate() {
        let store = store_with(&["v1"]).await;
        let req = ViewRecordRequest::new("v1", "sid", 3.0);

        assert!(store.record_view(&req).await.unwrap());
        assert!(!store.record_view(&req).await.unwrap());
        assert_eq!(store.view_count("v1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_short_watch_is_not_counted() {
        let store = store_with(&["v1"]).await;
        let req = ViewRecordRequest::new("v1", "sid", 2.9);

        assert!(!store.record_view(&req).await.unwrap());
        assert_eq!(store.view_count("v1").await.unwrap(), 0);

        // A later qualifying submission from the same session still counts
        let qualifying = ViewRecordRequest::new("v1", "sid", 3.0);
        assert!(store.record_view(&qualifying).await.unwrap());
    }

    #[tokio::test]
    async fn test_errors_are_normalized() {
        let store = store_with(&[]).await;
        let req = ViewRecordRequest::new("ghost", "sid", 5.0);
        assert!(matches!(store.record_view(&req).await, Err(Error::NotFound(_))));
        assert!(matches!(store.view_count("ghost").await, Err(Error::NotFound(_))));

        let anonymous = ViewRecordRequest::new("ghost", "", 5.0);
        assert!(matches!(
            store.record_view(&anonymous).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_count_once() {
        let store = store_with(&["v1"]).await;
        let req = ViewRecordRequest::new("v1", "same-tab", 4.0);

        let (a, b, c) = tokio::join!(
            store.record_view(&req),
            store.record_view(&req),
            store.record_view(&req)
        );
        let newly_counted = [a.unwrap(), b.unwrap(), c.unwrap()]
            .iter()
            .filter(|counted| **counted)
            .count();

        assert_eq!(newly_counted, 1);
        assert_eq!(store.view_count("v1").await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_sessions_on_file_database_all_count() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("showcase.db")).await.unwrap();
        let store = Arc::new(seeded(pool, &["v1"]).await);

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let req = ViewRecordRequest::new("v1", format!("sid-{}", i), 3.0);
                    store.record_view(&req).await
                })
            })
            .collect();

        for handle in handles {
            let counted = handle.await.unwrap().expect("concurrent record should not fail");
            assert!(counted);
        }
        assert_eq!(store.view_count("v1").await.unwrap(), 50);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_same_session_on_file_database_counts_once() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("showcase.db")).await.unwrap();
        let store = Arc::new(seeded(pool, &["v1"]).await);

        let handles: Vec<_> = (0..20)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    let req = ViewRecordRequest::new("v1", "same-tab", 4.0);
                    store.record_view(&req).await
                })
            })
            .collect();

        let mut newly_counted = 0;
        for handle in handles {
            if handle.await.unwrap().expect("concurrent record should not fail") {
                newly_counted += 1;
            }
        }
        assert_eq!(newly_counted, 1);
        assert_eq!(store.view_count("v1").await.unwrap(), 1);
    }
}
