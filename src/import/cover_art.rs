use crate::import::metadata::ParsedTags;
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_COVER_QUALITY: u8 = 50;

#[derive(Debug, Error)]
pub enum CoverArtError {
    #[error("Malformed cover image: {0}")]
    MalformedCoverImage(image::ImageError),
    #[error("Failed to encode cover as JPEG: {0}")]
    Encode(image::ImageError),
}

/// Decode an image in whatever format it was embedded in and re-encode it as
/// an RGB JPEG at `quality` (clamped to 1..=100).
pub fn transcode_cover(data: &[u8], quality: u8) -> Result<Vec<u8>, CoverArtError> {
    let decoded = image::load_from_memory(data).map_err(CoverArtError::MalformedCoverImage)?;
    let rgb = decoded.to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100))
        .encode_image(&rgb)
        .map_err(CoverArtError::Encode)?;

    debug!(
        "Transcoded {}x{} cover: {} -> {} bytes",
        rgb.width(),
        rgb.height(),
        data.len(),
        jpeg.len()
    );
    Ok(jpeg)
}

/// Pick the cover for a new track.
///
/// An uploaded cover is used verbatim. Otherwise the first embedded picture
/// is transcoded; a picture that fails to decode means no cover.
pub fn resolve_cover(
    tags: Option<&ParsedTags>,
    cover_override: Option<Vec<u8>>,
    quality: u8,
) -> Option<Vec<u8>> {
    if cover_override.is_some() {
        return cover_override;
    }

    let picture = tags?.picture.as_ref()?;
    match transcode_cover(&picture.data, quality) {
        Ok(jpeg) => Some(jpeg),
        Err(e) => {
            warn!("Ignoring embedded {} picture: {}", picture.mime_type, e);
            None
        }
    }
}
