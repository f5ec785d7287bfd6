//! Video catalog and view counter queries

use crate::db::models::{NewVideo, Video, ViewRecordRequest};
use crate::{Error, Result};
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::debug;

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// List all videos, newest first
pub async fn list_videos(pool: &SqlitePool) -> Result<Vec<Video>> {
    let videos = sqlx::query_as::<_, Video>(
        r#"
        SELECT id, title, description, thumbnail_url, video_url,
               view_count, duration_seconds, created_at
        FROM videos
        ORDER BY created_at DESC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(videos)
}

/// Current authoritative view count for a video
pub async fn get_view_count(pool: &SqlitePool, video_id: &str) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT view_count FROM videos WHERE id = ?")
        .bind(video_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::video_not_found(video_id))
}

/// Record a view fact; returns `true` only when this call incremented the counter
///
/// The insert and the increment share one transaction, and the
/// `UNIQUE(video_id, session_id)` constraint turns a repeated submission into
/// a no-op. The insert is the transaction's first statement so the write lock
/// is taken (waiting out `busy_timeout`) before anything is read; in WAL mode
/// a transaction that reads first cannot upgrade once another writer commits.
pub async fn record_view(pool: &SqlitePool, request: &ViewRecordRequest) -> Result<bool> {
    if request.session_id.is_empty() {
        return Err(Error::InvalidInput("session_id must not be empty".to_string()));
    }
    let watched = i64::try_from(request.watch_duration_seconds).map_err(|_| {
        Error::InvalidInput(format!(
            "watch_duration_seconds out of range: {}",
            request.watch_duration_seconds
        ))
    })?;

    let mut tx = pool.begin().await?;

    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO video_views (video_id, session_id, watch_duration_seconds, recorded_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&request.video_id)
    .bind(&request.session_id)
    .bind(watched)
    .bind(now_timestamp())
    .execute(&mut *tx)
    .await;

    // OR IGNORE does not cover foreign keys: an unknown video fails here
    let inserted = match inserted {
        Ok(result) => result.rows_affected(),
        Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
            return Err(Error::video_not_found(&request.video_id));
        }
        Err(e) => return Err(e.into()),
    };

    if inserted == 0 {
        tx.rollback().await?;
        debug!(
            "Duplicate view for video {} session {}",
            request.video_id, request.session_id
        );
        return Ok(false);
    }

    let updated = sqlx::query("UPDATE videos SET view_count = view_count + 1 WHERE id = ?")
        .bind(&request.video_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if updated == 0 {
        tx.rollback().await?;
        return Err(Error::video_not_found(&request.video_id));
    }

    tx.commit().await?;
    Ok(true)
}

/// Insert a catalog entry or refresh its metadata; never touches `view_count`
pub async fn upsert_video(pool: &SqlitePool, video: &NewVideo) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO videos (id, title, description, thumbnail_url, video_url, duration_seconds, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            description = excluded.description,
            thumbnail_url = excluded.thumbnail_url,
            video_url = excluded.video_url,
            duration_seconds = excluded.duration_seconds
        "#,
    )
    .bind(&video.id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.thumbnail_url)
    .bind(&video.video_url)
    .bind(video.duration_seconds)
    .bind(now_timestamp())
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a catalog entry with an explicit creation time (ordering tests, imports)
pub async fn insert_video_at(pool: &SqlitePool, video: &NewVideo, created_at: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO videos (id, title, description, thumbnail_url, video_url, duration_seconds, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&video.id)
    .bind(&video.title)
    .bind(&video.description)
    .bind(&video.thumbnail_url)
    .bind(&video.video_url)
    .bind(video.duration_seconds)
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(())
}
