// # Import Module
//
// Upload ingestion:
//
// - **metadata**: duration and ID3 tags from the written audio file
// - **cover_art**: embedded picture to JPEG, or the uploaded cover as-is
// - **service**: `ImportService` writes files and persists the track record

mod cover_art;
mod metadata;
mod service;

pub use cover_art::{resolve_cover, transcode_cover, CoverArtError, DEFAULT_COVER_QUALITY};
pub use metadata::{
    extract_metadata, probe_audio, AudioProbe, EmbeddedPicture, MetadataError, MetadataOverrides,
    ParsedTags, TrackMetadata,
};
pub use service::{ImportConfig, ImportError, ImportService, TrackUpload};
