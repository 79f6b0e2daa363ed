//! On-disk layout for uploaded media
//!
//! Everything lives under a single data root:
//! - `{data_root}/music/{uuid}.mp3` for audio
//! - `{data_root}/music_cover/{uuid}.jpg` for re-encoded covers
//!
//! Only storage-relative POSIX paths are persisted, so a library can be moved
//! to another mount point without rewriting the database.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

pub const AUDIO_DIR_NAME: &str = "music";
pub const COVER_DIR_NAME: &str = "music_cover";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Path {0:?} is outside the data root")]
    OutsideDataRoot(PathBuf),
    #[error("Invalid storage-relative path: {0}")]
    InvalidRelativePath(String),
}

#[derive(Debug, Clone)]
pub struct StorageLayout {
    data_root: PathBuf,
}

impl StorageLayout {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        StorageLayout {
            data_root: data_root.into(),
        }
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.data_root.join(AUDIO_DIR_NAME)
    }

    pub fn cover_dir(&self) -> PathBuf {
        self.data_root.join(COVER_DIR_NAME)
    }

    /// Create the audio and cover directories if they don't exist
    pub async fn ensure_dirs(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(self.audio_dir()).await?;
        tokio::fs::create_dir_all(self.cover_dir()).await?;
        Ok(())
    }

    /// Absolute path for a new audio file named after `id`
    pub fn audio_path(&self, id: &str) -> PathBuf {
        self.audio_dir().join(format!("{}.mp3", id))
    }

    /// Absolute path for a new cover file named after `id`
    pub fn cover_path(&self, id: &str) -> PathBuf {
        self.cover_dir().join(format!("{}.jpg", id))
    }

    /// Convert a path under the data root into its storage-relative POSIX form.
    ///
    /// `{data_root}/music/abc.mp3` becomes `music/abc.mp3` on every platform.
    pub fn relative_path(&self, path: &Path) -> Result<String, StorageError> {
        let relative = path
            .strip_prefix(&self.data_root)
            .map_err(|_| StorageError::OutsideDataRoot(path.to_path_buf()))?;

        let mut parts = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                _ => return Err(StorageError::OutsideDataRoot(path.to_path_buf())),
            }
        }

        if parts.is_empty() {
            return Err(StorageError::OutsideDataRoot(path.to_path_buf()));
        }

        Ok(parts.join("/"))
    }

    /// Resolve a persisted storage-relative path back to a filesystem path.
    ///
    /// Rejects absolute paths and parent-directory segments so a stored path
    /// can never point outside the data root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, StorageError> {
        if relative.is_empty() || relative.starts_with('/') || relative.contains('\\') {
            return Err(StorageError::InvalidRelativePath(relative.to_string()));
        }

        let mut resolved = self.data_root.clone();
        for segment in relative.split('/') {
            match segment {
                "" | "." => {}
                ".." => return Err(StorageError::InvalidRelativePath(relative.to_string())),
                part => resolved.push(part),
            }
        }
        Ok(resolved)
    }
}

/// Guess a MIME type from a stored file's extension
pub fn guess_mime_type(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "mp3" => Some("audio/mpeg"),
        "flac" => Some("audio/flac"),
        "ogg" => Some("audio/ogg"),
        "wav" => Some("audio/wav"),
        "m4a" => Some("audio/mp4"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}
