use chrono::SecondsFormat;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::db::models::*;

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Initialize database connection and create tables
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        // Use sqlite:// with ?mode=rwc to create if it doesn't exist
        let database_url = format!("sqlite://{}?mode=rwc", database_path);
        info!("Connecting to {}", database_url);
        let pool = SqlitePool::connect(&database_url).await?;

        let db = Database { pool };
        db.create_tables().await?;
        Ok(db)
    }

    /// In-memory database for tests.
    ///
    /// Each SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection.
    pub async fn new_in_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Database { pool };
        db.create_tables().await?;
        Ok(db)
    }

    /// Create all necessary tables
    async fn create_tables(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tracks (
                id TEXT PRIMARY KEY,
                title TEXT,
                artist TEXT,
                path TEXT NOT NULL,
                cover_path TEXT,
                duration INTEGER NOT NULL CHECK (duration >= 0),
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tracks_created_at ON tracks (created_at, id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a track inside a transaction
    ///
    /// Timestamps are written at fixed microsecond width so that ordering by
    /// the text column matches chronological order.
    pub async fn insert_track(&self, track: &DbTrack) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO tracks (
                id, title, artist, path, cover_path, duration, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&track.id)
        .bind(&track.title)
        .bind(&track.artist)
        .bind(&track.path)
        .bind(&track.cover_path)
        .bind(track.duration)
        .bind(track.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Inserted track {}", track.id);
        Ok(())
    }

    /// Total number of tracks
    pub async fn count_tracks(&self) -> Result<u64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Up to `limit` tracks starting at `offset`, oldest first
    pub async fn get_tracks_page(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<DbTrack>, sqlx::Error> {
        let rows = sqlx::query(
            "SELECT * FROM tracks ORDER BY created_at ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(track_from_row).collect())
    }

    pub async fn get_track_by_id(&self, track_id: &str) -> Result<Option<DbTrack>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM tracks WHERE id = ?")
            .bind(track_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(track_from_row))
    }
}

fn track_from_row(row: &SqliteRow) -> DbTrack {
    DbTrack {
        id: row.get("id"),
        title: row.get("title"),
        artist: row.get("artist"),
        path: row.get("path"),
        cover_path: row.get("cover_path"),
        duration: row.get("duration"),
        created_at: row.get("created_at"),
    }
}
