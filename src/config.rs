use crate::import::DEFAULT_COVER_QUALITY;
use crate::streaming::DEFAULT_CHUNK_SIZE as DEFAULT_STREAM_CHUNK_SIZE;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Application configuration
///
/// Built once at startup and handed to every component that needs it.
/// In debug builds a `.env` file is loaded into the environment first.
#[derive(Clone, Debug)]
pub struct Config {
    /// Root directory for uploaded audio and cover files
    pub data_root: PathBuf,
    /// SQLite database file
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Externally visible base URL used when building track links.
    /// Falls back to the request `Host` header when unset.
    pub public_url: Option<String>,
    /// Bytes read per chunk when streaming a track
    pub stream_chunk_size: usize,
    /// JPEG quality (1-100) for re-encoded embedded covers
    pub cover_quality: u8,
    pub max_upload_bytes: usize,
    /// Client IPs allowed to use the API. Empty allows everyone.
    pub allowed_hosts: Vec<IpAddr>,
    /// CORS origins. Empty means permissive.
    pub cors_origins: Vec<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self, ConfigError> {
        #[cfg(debug_assertions)]
        {
            if dotenvy::dotenv().is_ok() {
                tracing::info!("Config: dev mode, loaded .env file");
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_root = get("TUNESHELF_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_root);

        let database_path = get("TUNESHELF_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_root.join("library.db"));

        let bind_addr_raw =
            get("TUNESHELF_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr_raw
            .parse::<SocketAddr>()
            .map_err(|e| invalid("TUNESHELF_BIND_ADDR", &bind_addr_raw, e))?;

        let public_url = get("TUNESHELF_PUBLIC_URL").map(|url| url.trim_end_matches('/').to_string());

        let stream_chunk_size = match get("TUNESHELF_STREAM_CHUNK_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(0) => return Err(invalid("TUNESHELF_STREAM_CHUNK_SIZE", &raw, "must be positive")),
                Ok(n) => n,
                Err(e) => return Err(invalid("TUNESHELF_STREAM_CHUNK_SIZE", &raw, e)),
            },
            None => DEFAULT_STREAM_CHUNK_SIZE,
        };

        let cover_quality = match get("TUNESHELF_COVER_QUALITY") {
            Some(raw) => match raw.parse::<u8>() {
                Ok(q) if (1..=100).contains(&q) => q,
                Ok(_) => return Err(invalid("TUNESHELF_COVER_QUALITY", &raw, "must be within 1..=100")),
                Err(e) => return Err(invalid("TUNESHELF_COVER_QUALITY", &raw, e)),
            },
            None => DEFAULT_COVER_QUALITY,
        };

        let max_upload_bytes = match get("TUNESHELF_MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| invalid("TUNESHELF_MAX_UPLOAD_BYTES", &raw, e))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let allowed_hosts = match get("TUNESHELF_ALLOWED_HOSTS") {
            Some(raw) => split_list(&raw)
                .map(|host| {
                    host.parse::<IpAddr>()
                        .map_err(|e| invalid("TUNESHELF_ALLOWED_HOSTS", host, e))
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        let cors_origins = get("TUNESHELF_CORS_ORIGINS")
            .map(|raw| split_list(&raw).map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self {
            data_root,
            database_path,
            bind_addr,
            public_url,
            stream_chunk_size,
            cover_quality,
            max_upload_bytes,
            allowed_hosts,
            cors_origins,
        })
    }

    /// Defaulted configuration rooted at `data_root`
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        let data_root = data_root.into();
        Self {
            database_path: data_root.join("library.db"),
            data_root,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            public_url: None,
            stream_chunk_size: DEFAULT_STREAM_CHUNK_SIZE,
            cover_quality: DEFAULT_COVER_QUALITY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_hosts: Vec::new(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_data_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tuneshelf"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn invalid(key: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
