use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum length, in characters, of a stored title or artist
pub const MAX_TEXT_FIELD_CHARS: usize = 60;

/// An ingested audio track
///
/// Created exactly once by the import service and never updated afterwards.
/// `path` and `cover_path` are storage-relative POSIX paths (see
/// [`crate::storage::StorageLayout::relative_path`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DbTrack {
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub path: String,
    pub cover_path: Option<String>,
    /// Length in whole seconds
    pub duration: i64,
    pub created_at: DateTime<Utc>,
}

impl DbTrack {
    /// Build a new track record, truncating title and artist to
    /// [`MAX_TEXT_FIELD_CHARS`]
    pub fn new(
        id: &str,
        title: Option<String>,
        artist: Option<String>,
        path: String,
        cover_path: Option<String>,
        duration_seconds: u64,
    ) -> Self {
        DbTrack {
            id: id.to_string(),
            title: title.map(truncate_text_field),
            artist: artist.map(truncate_text_field),
            path,
            cover_path,
            duration: i64::try_from(duration_seconds).unwrap_or(i64::MAX),
            created_at: Utc::now(),
        }
    }

    /// Fresh unique identifier for a track
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }
}

fn truncate_text_field(value: String) -> String {
    match value.char_indices().nth(MAX_TEXT_FIELD_CHARS) {
        Some((byte_index, _)) => value[..byte_index].to_string(),
        None => value,
    }
}
