// # Import Service
//
// Turns an upload into a persisted track:
// 1. write the audio under `music/{id}.mp3`
// 2. extract metadata and resolve the cover (blocking, off the async runtime)
// 3. write the cover under `music_cover/{uuid}.jpg` if there is one
// 4. store both paths relative to the data root
// 5. insert the track record
//
// Files written before a failed insert are left on disk and logged.

use crate::db::DbTrack;
use crate::import::cover_art::DEFAULT_COVER_QUALITY;
use crate::import::metadata::{extract_metadata, MetadataOverrides, TrackMetadata};
use crate::library::{LibraryError, SharedLibraryManager};
use crate::storage::{StorageError, StorageLayout};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    #[error("Metadata task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<std::io::Error> for ImportError {
    fn from(e: std::io::Error) -> Self {
        ImportError::Storage(StorageError::Io(e))
    }
}

/// Raw upload as received from the client
#[derive(Debug, Clone, Default)]
pub struct TrackUpload {
    pub audio: Vec<u8>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// JPEG quality for transcoded embedded covers
    pub cover_quality: u8,
}

impl Default for ImportConfig {
    fn default() -> Self {
        ImportConfig {
            cover_quality: DEFAULT_COVER_QUALITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportService {
    library_manager: SharedLibraryManager,
    storage: StorageLayout,
    config: ImportConfig,
}

impl ImportService {
    pub fn new(
        library_manager: SharedLibraryManager,
        storage: StorageLayout,
        config: ImportConfig,
    ) -> Self {
        ImportService {
            library_manager,
            storage,
            config,
        }
    }

    /// Ingest one uploaded track and return the persisted record
    pub async fn ingest_track(&self, upload: TrackUpload) -> Result<DbTrack, ImportError> {
        self.storage.ensure_dirs().await?;

        let track_id = DbTrack::generate_id();
        let audio_path = self.storage.audio_path(&track_id);
        tokio::fs::write(&audio_path, &upload.audio).await?;

        let overrides = MetadataOverrides {
            title: upload.title,
            artist: upload.artist,
            cover: upload.cover,
        };
        let metadata = self.extract(audio_path.clone(), overrides).await?;

        let cover_path = match &metadata.cover_bytes {
            Some(bytes) => {
                let path = self.storage.cover_path(&Uuid::new_v4().to_string());
                tokio::fs::write(&path, bytes).await?;
                Some(path)
            }
            None => None,
        };

        let relative_audio = self.storage.relative_path(&audio_path)?;
        let relative_cover = cover_path
            .as_deref()
            .map(|path| self.storage.relative_path(path))
            .transpose()?;

        let track = DbTrack::new(
            &track_id,
            metadata.title,
            metadata.artist,
            relative_audio,
            relative_cover,
            metadata.duration_seconds,
        );

        if let Err(e) = self.library_manager.get().add_track(&track).await {
            warn!(
                "Failed to record track {}, leaving orphaned files {:?} and {:?}",
                track_id, audio_path, cover_path
            );
            return Err(e.into());
        }

        info!(
            "Imported track {} ({}s, title: {:?}, artist: {:?}, cover: {})",
            track.id,
            track.duration,
            track.title,
            track.artist,
            track.cover_path.is_some()
        );
        Ok(track)
    }

    async fn extract(
        &self,
        audio_path: PathBuf,
        overrides: MetadataOverrides,
    ) -> Result<TrackMetadata, ImportError> {
        let cover_quality = self.config.cover_quality;
        let metadata = tokio::task::spawn_blocking(move || {
            extract_metadata(&audio_path, overrides, cover_quality)
        })
        .await?;
        Ok(metadata)
    }
}
