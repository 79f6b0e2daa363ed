use crate::api::{ApiError, AppState};
use crate::db::DbTrack;
use crate::import::TrackUpload;
use crate::pagination::{paginate, Page};
use crate::storage::guess_mime_type;
use crate::streaming::stream_file;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_LIMIT: u64 = 100;

const FIELD_AUDIO: &str = "music_track_file";
const FIELD_COVER: &str = "music_track_cover_file";
const FIELD_TITLE: &str = "music_track_title";
const FIELD_ARTIST: &str = "music_track_artist";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

/// Track as shown in listings
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrackSummary {
    pub id: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    /// Streaming endpoint for this track
    pub url: String,
    pub cover_url: Option<String>,
    pub duration: i64,
    pub mime_type: Option<String>,
}

impl TrackSummary {
    fn from_track(track: DbTrack, base_url: &str) -> Self {
        let cover_url = track
            .cover_path
            .as_deref()
            .and_then(|path| path.rsplit('/').next())
            .map(|file_name| format!("{}/music_track_covers/{}", base_url, file_name));

        TrackSummary {
            url: format!("{}/api/v1/tracks/{}", base_url, track.id),
            mime_type: guess_mime_type(&track.path).map(str::to_string),
            id: track.id,
            title: track.title,
            artist: track.artist,
            cover_url,
            duration: track.duration,
        }
    }
}

/// Base for absolute links: the configured public URL, else the `Host` the
/// client used
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(public_url) = &state.config.public_url {
        return public_url.trim_end_matches('/').to_string();
    }

    match headers.get(header::HOST).and_then(|host| host.to_str().ok()) {
        Some(host) => format!("http://{}", host),
        None => format!("http://{}", state.config.bind_addr),
    }
}

pub async fn list_tracks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<TrackSummary>>, ApiError> {
    let library = state.library_manager.get();
    let total = library.count_tracks().await?;
    let window = library.get_tracks(query.offset, query.limit).await?;
    debug!(
        "Listing tracks offset={} limit={}: {} of {}",
        query.offset,
        query.limit,
        window.len(),
        total
    );

    let base_url = base_url(&state, &headers);
    let page = paginate(window, query.offset, query.limit, total)
        .map(|track| TrackSummary::from_track(track, &base_url));
    Ok(Json(page))
}

pub async fn stream_track(
    State(state): State<AppState>,
    Path(track_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let track = state
        .library_manager
        .get()
        .get_track(&track_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let path = state.storage.resolve(&track.path)?;
    debug!("Streaming track {} from {:?}", track.id, path);

    let response = stream_file(
        &path,
        headers.get(header::RANGE),
        state.config.stream_chunk_size,
    )
    .await?;
    Ok(response)
}

pub async fn upload_track(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<StatusCode, ApiError> {
    let mut upload = TrackUpload::default();
    let mut has_audio = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FIELD_AUDIO => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                upload.audio = bytes.to_vec();
                has_audio = true;
            }
            FIELD_COVER => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                upload.cover = (!bytes.is_empty()).then(|| bytes.to_vec());
            }
            FIELD_TITLE | FIELD_ARTIST => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.body_text()))?;
                let value = (!text.is_empty()).then_some(text);
                if name == FIELD_TITLE {
                    upload.title = value;
                } else {
                    upload.artist = value;
                }
            }
            other => debug!("Ignoring form field {:?}", other),
        }
    }

    if !has_audio {
        return Err(ApiError::BadRequest(format!(
            "Missing required field {}",
            FIELD_AUDIO
        )));
    }

    info!("Received upload of {} bytes", upload.audio.len());
    state.import_service.ingest_track(upload).await?;
    Ok(StatusCode::OK)
}
