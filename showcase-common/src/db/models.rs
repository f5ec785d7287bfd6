//! Database models

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// A showcase video as owned by the authoritative store
///
/// Clients hold a read-only cached copy per page load; only `view_count`
/// ever changes on their side, and only upwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_url: String,
    pub video_url: String,
    pub view_count: i64,
    pub duration_seconds: i64,
    pub created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, SqliteRow> for Video {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let created_at: String = row.try_get("created_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            thumbnail_url: row.try_get("thumbnail_url")?,
            video_url: row.try_get("video_url")?,
            view_count: row.try_get("view_count")?,
            duration_seconds: row.try_get("duration_seconds")?,
            created_at: parse_timestamp(&created_at).map_err(|e| sqlx::Error::ColumnDecode {
                index: "created_at".to_string(),
                source: e.into(),
            })?,
        })
    }
}

/// Catalog entry used to seed or update a video (counts are never seeded)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVideo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub thumbnail_url: String,
    pub video_url: String,
    #[serde(default)]
    pub duration_seconds: i64,
}

/// A view fact asserted to the store: `(video, session, floored watch seconds)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewRecordRequest {
    pub video_id: String,
    pub session_id: String,
    pub watch_duration_seconds: u64,
}

impl ViewRecordRequest {
    /// Build a request, flooring the watch duration to whole seconds
    pub fn new(video_id: impl Into<String>, session_id: impl Into<String>, watched_seconds: f64) -> Self {
        let floored = if watched_seconds.is_finite() && watched_seconds > 0.0 {
            watched_seconds.floor() as u64
        } else {
            0
        };
        Self {
            video_id: video_id.into(),
            session_id: session_id.into(),
            watch_duration_seconds: floored,
        }
    }
}

/// Parse a stored timestamp
///
/// Accepts RFC 3339 (what this crate writes) and SQLite's
/// `CURRENT_TIMESTAMP` format (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|naive| naive.and_utc()),
    }
}
