use crate::db::{Database, DbTrack};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// The main library manager for track persistence and queries
///
/// Tracks are inserted once by the import service and are read-only
/// afterwards, so no locking is needed around reads.
#[derive(Debug, Clone)]
pub struct LibraryManager {
    database: Database,
}

impl LibraryManager {
    pub fn new(database: Database) -> Self {
        LibraryManager { database }
    }

    /// Persist a freshly ingested track
    pub async fn add_track(&self, track: &DbTrack) -> Result<(), LibraryError> {
        self.database.insert_track(track).await?;
        Ok(())
    }

    pub async fn count_tracks(&self) -> Result<u64, LibraryError> {
        Ok(self.database.count_tracks().await?)
    }

    /// Window of up to `limit` tracks starting at `offset`
    pub async fn get_tracks(&self, offset: u64, limit: u64) -> Result<Vec<DbTrack>, LibraryError> {
        Ok(self.database.get_tracks_page(offset, limit).await?)
    }

    pub async fn get_track(&self, track_id: &str) -> Result<Option<DbTrack>, LibraryError> {
        Ok(self.database.get_track_by_id(track_id).await?)
    }
}
