#![allow(dead_code)]

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tuneshelf::api::{create_router, AppState};
use tuneshelf::config::Config;
use tuneshelf::db::Database;
use tuneshelf::import::{ImportConfig, ImportService};
use tuneshelf::library::{LibraryManager, SharedLibraryManager};
use tuneshelf::storage::StorageLayout;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, no CRC, no padding
const FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];
/// 144 * 128000 / 44100, rounded down
const FRAME_LEN: usize = 417;
pub const SAMPLES_PER_FRAME: u64 = 1152;
pub const SAMPLE_RATE: u64 = 44_100;

/// Initialize tracing for tests with proper test output handling
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Raw MPEG audio made of `frames` silent frames
pub fn mpeg_frames(frames: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        data.extend_from_slice(&FRAME_HEADER);
        data.resize(data.len() + FRAME_LEN - FRAME_HEADER.len(), 0);
    }
    data
}

/// Whole seconds of audio in `frames` frames
pub fn floored_seconds(frames: usize) -> u64 {
    frames as u64 * SAMPLES_PER_FRAME / SAMPLE_RATE
}

/// Tags to attach to a generated MP3
#[derive(Default)]
pub struct TestTags<'a> {
    pub title: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub pictures: Vec<Vec<u8>>,
}

/// Build an MP3 file in memory: `frames` audio frames behind an ID3v2.4 tag
/// when any tag field is set
pub fn build_mp3(frames: usize, tags: TestTags<'_>) -> Vec<u8> {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("build.mp3");
    write_mp3(&path, frames, tags);
    std::fs::read(&path).unwrap()
}

pub fn write_mp3(path: &Path, frames: usize, tags: TestTags<'_>) {
    std::fs::write(path, mpeg_frames(frames)).unwrap();

    if tags.title.is_none() && tags.artist.is_none() && tags.pictures.is_empty() {
        return;
    }

    let mut tag = Tag::new();
    if let Some(title) = tags.title {
        tag.set_title(title);
    }
    if let Some(artist) = tags.artist {
        tag.set_artist(artist);
    }
    for (index, data) in tags.pictures.into_iter().enumerate() {
        tag.add_frame(Picture {
            mime_type: "image/png".to_string(),
            picture_type: if index == 0 {
                PictureType::CoverFront
            } else {
                PictureType::CoverBack
            },
            description: format!("picture {}", index),
            data,
        });
    }
    tag.write_to_path(path, Version::Id3v24).unwrap();
}

/// RGBA PNG, so transcoding has to drop the alpha channel
pub fn png_cover(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 255 / width) as u8, (y * 255 / height) as u8, 90, 180])
    });
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Import service over an in-memory database rooted at `temp_dir`
pub async fn import_service(temp_dir: &TempDir) -> (ImportService, SharedLibraryManager) {
    let database = Database::new_in_memory().await.unwrap();
    let library_manager = SharedLibraryManager::new(LibraryManager::new(database));
    let service = ImportService::new(
        library_manager.clone(),
        StorageLayout::new(temp_dir.path()),
        ImportConfig::default(),
    );
    (service, library_manager)
}

/// Router over an in-memory database rooted at `temp_dir`
pub async fn test_app(temp_dir: &TempDir) -> (axum::Router, AppState) {
    test_app_with(Config::with_data_root(temp_dir.path())).await
}

pub async fn test_app_with(config: Config) -> (axum::Router, AppState) {
    let database = Database::new_in_memory().await.unwrap();
    let state = AppState::new(config, database);
    state.storage.ensure_dirs().await.unwrap();
    (create_router(state.clone()), state)
}

/// 128-byte ID3v1 trailer with NUL-padded title and artist
pub fn id3v1_trailer(title: &str, artist: &str) -> Vec<u8> {
    fn field(value: &str, len: usize) -> Vec<u8> {
        let mut bytes = value.as_bytes().to_vec();
        bytes.resize(len, 0);
        bytes
    }

    let mut tag = b"TAG".to_vec();
    tag.extend(field(title, 30));
    tag.extend(field(artist, 30));
    tag.extend(field("", 30)); // album
    tag.extend(field("2001", 4));
    tag.extend(field("", 30)); // comment
    tag.push(255); // no genre
    tag
}
