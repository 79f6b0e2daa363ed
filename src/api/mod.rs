// # HTTP API
//
// - `GET  /`                      health check
// - `GET  /api/v1/tracks`         paginated listing
// - `POST /api/v1/tracks`         multipart upload
// - `GET  /api/v1/tracks/:id`     range-aware audio stream
// - `/music_tracks/*`, `/music_track_covers/*` static files from the data root

mod error;
mod middleware;
mod tracks;

pub use error::ApiError;
pub use middleware::{client_ip, restrict_hosts};
pub use tracks::{ListQuery, TrackSummary};

use crate::config::Config;
use crate::db::Database;
use crate::import::{ImportConfig, ImportService};
use crate::library::{LibraryManager, SharedLibraryManager};
use crate::storage::StorageLayout;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub library_manager: SharedLibraryManager,
    pub storage: StorageLayout,
    pub import_service: ImportService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, database: Database) -> Self {
        let library_manager = SharedLibraryManager::new(LibraryManager::new(database));
        let storage = StorageLayout::new(&config.data_root);
        let import_service = ImportService::new(
            library_manager.clone(),
            storage.clone(),
            ImportConfig {
                cover_quality: config.cover_quality,
            },
        );

        AppState {
            library_manager,
            storage,
            import_service,
            config: Arc::new(config),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let tracks = Router::new()
        .route("/tracks", get(tracks::list_tracks).post(tracks::upload_track))
        .route("/tracks/", get(tracks::list_tracks).post(tracks::upload_track))
        .route("/tracks/:id", get(tracks::stream_track))
        .route("/tracks/:id/", get(tracks::stream_track));

    Router::new()
        .route("/", get(health))
        .nest("/api/v1", tracks)
        .nest_service("/music_tracks", ServeDir::new(state.storage.audio_dir()))
        .nest_service("/music_track_covers", ServeDir::new(state.storage.cover_dir()))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            restrict_hosts,
        ))
        .layer(cors_layer(&state.config.cors_origins))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "detail": "API work!" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping invalid CORS origin {:?}: {}", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::RANGE])
}
