use crate::streaming::{ChunkedFileReader, RangeNotSatisfiable, RangeSpec};
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const AUDIO_CONTENT_TYPE: &str = "audio/mpeg";

#[derive(Error, Debug)]
pub enum StreamError {
    #[error(transparent)]
    RangeNotSatisfiable(#[from] RangeNotSatisfiable),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream an audio file, honoring an optional `Range` request header.
///
/// - no header: 200 with the whole file
/// - satisfiable header: 206 with `Content-Range`, `Accept-Ranges` and
///   `Content-Length` for the requested interval
/// - unsatisfiable or malformed header: [`StreamError::RangeNotSatisfiable`],
///   which renders as 416
///
/// The body is produced lazily by a [`ChunkedFileReader`]; at most one chunk
/// of the file is held in memory at a time.
pub async fn stream_file(
    path: &Path,
    range_header: Option<&HeaderValue>,
    chunk_size: usize,
) -> Result<Response, StreamError> {
    let total_size = tokio::fs::metadata(path).await?.len();

    let Some(range_header) = range_header.filter(|value| !is_blank(value)) else {
        return full_response(path, total_size, chunk_size).await;
    };

    // A header that isn't valid visible ASCII can't be a valid byte range
    let header_value = range_header
        .to_str()
        .map_err(|_| RangeNotSatisfiable { total_size })?;
    let range = RangeSpec::parse(Some(header_value), total_size)?;

    debug!(
        "Serving {} of {:?} ({} bytes)",
        range.content_range(),
        path,
        range.content_length()
    );

    let reader = ChunkedFileReader::open(path, &range, chunk_size).await?;
    let headers = [
        (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_string()),
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CONTENT_RANGE, range.content_range()),
        (header::CONTENT_LENGTH, range.content_length().to_string()),
    ];

    Ok((
        StatusCode::PARTIAL_CONTENT,
        headers,
        Body::from_stream(reader.into_stream()),
    )
        .into_response())
}

fn is_blank(value: &HeaderValue) -> bool {
    value.as_bytes().iter().all(u8::is_ascii_whitespace)
}

async fn full_response(
    path: &Path,
    total_size: u64,
    chunk_size: usize,
) -> Result<Response, StreamError> {
    debug!("Serving full file {:?} ({} bytes)", path, total_size);

    let reader = match RangeSpec::full(total_size) {
        Some(range) => ChunkedFileReader::open(path, &range, chunk_size).await?,
        None => ChunkedFileReader::open_at(path, 0, 0, chunk_size).await?,
    };
    let headers = [
        (header::CONTENT_TYPE, AUDIO_CONTENT_TYPE.to_string()),
        (header::ACCEPT_RANGES, "bytes".to_string()),
        (header::CONTENT_LENGTH, total_size.to_string()),
    ];

    Ok((
        StatusCode::OK,
        headers,
        Body::from_stream(reader.into_stream()),
    )
        .into_response())
}

impl IntoResponse for RangeNotSatisfiable {
    fn into_response(self) -> Response {
        (
            StatusCode::RANGE_NOT_SATISFIABLE,
            [(header::CONTENT_RANGE, self.content_range())],
        )
            .into_response()
    }
}
