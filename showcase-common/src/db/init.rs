//! Database initialization
//!
//! Creates the database on first run and brings the schema up idempotently,
//! so the service can start against an empty root folder.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "showcase.db";

const MAX_CONNECTIONS: u32 = 10;
const BUSY_TIMEOUT_MS: u64 = 5000;

/// Initialize database connection and create tables if needed
///
/// Pragmas are set through the connect options so every pooled connection
/// gets them, not just the first one.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // WAL lets the gallery listing read while a view is being recorded
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }
    info!(
        "Database pool ready: {} connections, busy_timeout={}ms",
        MAX_CONNECTIONS, BUSY_TIMEOUT_MS
    );

    create_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// Limited to a single connection: every SQLite `:memory:` connection is a
/// separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_videos_table(pool).await?;
    create_video_views_table(pool).await?;

    Ok(())
}

async fn create_videos_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            thumbnail_url TEXT NOT NULL,
            video_url TEXT NOT NULL,
            view_count INTEGER NOT NULL DEFAULT 0 CHECK (view_count >= 0),
            duration_seconds INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_videos_created_at ON videos(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// One row per counted `(video, session)` pair
///
/// The UNIQUE constraint is what makes a view increment durable at most once.
async fn create_video_views_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS video_views (
            video_id TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
            session_id TEXT NOT NULL,
            watch_duration_seconds INTEGER NOT NULL,
            recorded_at TEXT NOT NULL,
            UNIQUE (video_id, session_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
