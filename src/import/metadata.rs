// # Audio Metadata Extractor
//
// Reads duration from the MPEG audio stream (symphonia) and title, artist and
// the first embedded picture from the ID3 tag (id3). Extraction never fails
// from the caller's point of view: an unrecognized payload degrades to a zero
// duration with no tags.

use crate::import::cover_art::resolve_cover;
use std::fs::File;
use std::path::Path;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Unrecognized audio format: {0}")]
    UnrecognizedAudioFormat(#[from] SymphoniaError),
    #[error("No audio track found")]
    NoAudioTrack,
    #[error("Audio track has no sample rate")]
    MissingSampleRate,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A picture embedded in the tag container
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedPicture {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Typed view over the parts of an ID3 tag we care about
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// First embedded picture; later ones are ignored
    pub picture: Option<EmbeddedPicture>,
}

impl ParsedTags {
    fn from_tag(tag: &id3::Tag) -> Self {
        use id3::TagLike;

        ParsedTags {
            title: tag.title().map(first_text_value),
            artist: tag.artist().map(first_text_value),
            picture: tag.pictures().next().map(|picture| EmbeddedPicture {
                mime_type: picture.mime_type.clone(),
                data: picture.data.clone(),
            }),
        }
    }
}

/// What probing a file yields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioProbe {
    pub duration_seconds: u64,
    /// `None` when the file carries no tag container at all
    pub tags: Option<ParsedTags>,
}

/// Upload-time values that take precedence over anything read from the file
#[derive(Debug, Clone, Default)]
pub struct MetadataOverrides {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub cover: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    pub duration_seconds: u64,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// JPEG bytes, or the verbatim override
    pub cover_bytes: Option<Vec<u8>>,
}

/// ID3v2.4 frames may hold several NUL-separated values; keep the first
fn first_text_value(text: &str) -> String {
    text.split('\0').next().unwrap_or(text).to_string()
}

/// Probe an audio file for its duration and tags.
///
/// Fails with [`MetadataError::UnrecognizedAudioFormat`] when no MPEG audio
/// stream can be found. Tags are only read once the audio is recognized.
pub fn probe_audio(path: &Path) -> Result<AudioProbe, MetadataError> {
    let file = File::open(path)?;
    let media_source = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe().format(
        &hint,
        media_source,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format.default_track().ok_or(MetadataError::NoAudioTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(MetadataError::MissingSampleRate)?;

    let n_frames = match track.codec_params.n_frames {
        Some(n_frames) => n_frames,
        None => {
            // No Xing/Info header: walk the packets and sum their durations
            let mut n_frames = 0u64;
            loop {
                match format.next_packet() {
                    Ok(packet) if packet.track_id() == track_id => n_frames += packet.dur(),
                    Ok(_) => {}
                    Err(SymphoniaError::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break
                    }
                    Err(e) => {
                        debug!("Stopped counting frames in {:?}: {}", path, e);
                        break;
                    }
                }
            }
            n_frames
        }
    };

    let duration_seconds = n_frames / u64::from(sample_rate);
    debug!(
        "Probed {:?}: {} frames at {} Hz ({}s)",
        path, n_frames, sample_rate, duration_seconds
    );

    Ok(AudioProbe {
        duration_seconds,
        tags: read_tags(path),
    })
}

/// ID3v2 when present, else an ID3v1 trailer
fn read_tags(path: &Path) -> Option<ParsedTags> {
    match id3::v1v2::read_from_path(path) {
        Ok(tag) => Some(ParsedTags::from_tag(&tag)),
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => None,
        Err(e) => {
            warn!("Failed to read ID3 tag from {:?}: {}", path, e);
            None
        }
    }
}

/// Extract everything ingestion needs from a just-written audio file.
///
/// Overrides win over tag values for title, artist and cover alike. Probe
/// failures are logged and absorbed into a zero-duration, tagless result.
pub fn extract_metadata(
    path: &Path,
    overrides: MetadataOverrides,
    cover_quality: u8,
) -> TrackMetadata {
    let probe = match probe_audio(path) {
        Ok(probe) => probe,
        Err(e) => {
            warn!("Could not read audio metadata from {:?}: {}", path, e);
            AudioProbe::default()
        }
    };

    let (tag_title, tag_artist) = match &probe.tags {
        Some(tags) => (tags.title.clone(), tags.artist.clone()),
        None => (None, None),
    };

    TrackMetadata {
        duration_seconds: probe.duration_seconds,
        title: overrides.title.or(tag_title),
        artist: overrides.artist.or(tag_artist),
        cover_bytes: resolve_cover(probe.tags.as_ref(), overrides.cover, cover_quality),
    }
}
