// Chunked File Reader
//
// Reads a byte interval of a file in bounded chunks so a response body never
// holds more than one chunk in memory. The file handle is owned by the reader
// and closed when the reader (or the stream built from it) is dropped, which
// covers exhaustion, I/O errors and clients that disconnect mid-stream.

use crate::streaming::RangeSpec;
use axum::body::Bytes;
use futures::Stream;
use std::io::SeekFrom;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

pub struct ChunkedFileReader {
    file: File,
    remaining: u64,
    chunk_size: usize,
}

impl ChunkedFileReader {
    /// Open `path` positioned at `range.start`, ready to yield `range` bytes
    pub async fn open(path: &Path, range: &RangeSpec, chunk_size: usize) -> std::io::Result<Self> {
        Self::open_at(path, range.start, range.content_length(), chunk_size).await
    }

    /// Open `path` positioned at `start`, ready to yield up to `length` bytes
    pub async fn open_at(
        path: &Path,
        start: u64,
        length: u64,
        chunk_size: usize,
    ) -> std::io::Result<Self> {
        let mut file = File::open(path).await?;
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }

        Ok(ChunkedFileReader {
            file,
            remaining: length,
            chunk_size: chunk_size.max(1),
        })
    }

    /// Read the next chunk of at most `chunk_size` bytes.
    ///
    /// Returns `None` once the interval is exhausted, or early if the file
    /// ends before the interval does.
    pub async fn next_chunk(&mut self) -> std::io::Result<Option<Bytes>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let want = self.remaining.min(self.chunk_size as u64) as usize;
        let mut buffer = vec![0u8; want];
        let bytes_read = self.file.read(&mut buffer).await?;

        if bytes_read == 0 {
            // Physical EOF before the declared end
            self.remaining = 0;
            return Ok(None);
        }

        buffer.truncate(bytes_read);
        self.remaining -= bytes_read as u64;
        Ok(Some(Bytes::from(buffer)))
    }

    /// Turn the reader into a lazy stream of chunks.
    ///
    /// The stream is finite and not restartable. It ends after the first
    /// I/O error.
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        futures::stream::try_unfold(self, |mut reader| async move {
            let chunk = reader.next_chunk().await?;
            Ok::<_, std::io::Error>(chunk.map(|chunk| (chunk, reader)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::TempDir;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    async fn collect(reader: ChunkedFileReader) -> (Vec<usize>, Vec<u8>) {
        let chunks: Vec<Bytes> = reader
            .into_stream()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        let sizes = chunks.iter().map(|c| c.len()).collect();
        let data = chunks.concat();
        (sizes, data)
    }

    #[tokio::test]
    async fn reads_interval_in_bounded_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("track.mp3");
        let data = pattern(10_000);
        std::fs::write(&path, &data).unwrap();

        let range = RangeSpec {
            start: 100,
            end: 2_599,
            total_size: 10_000,
        };
        let reader = ChunkedFileReader::open(&path, &range, 1024).await.unwrap();
        let (sizes, bytes) = collect(reader).await;

        assert_eq!(sizes, vec![1024, 1024, 452]);
        assert_eq!(bytes, &data[100..2_600]);
    }

    #[tokio::test]
    async fn stops_at_physical_eof() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.mp3");
        let data = pattern(300);
        std::fs::write(&path, &data).unwrap();

        // Declared interval runs past the end of the file
        let reader = ChunkedFileReader::open_at(&path, 200, 1_000, 64).await.unwrap();
        let (_, bytes) = collect(reader).await;
        assert_eq!(bytes, &data[200..]);
    }

    #[tokio::test]
    async fn zero_length_interval_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.mp3");
        std::fs::write(&path, b"").unwrap();

        let reader = ChunkedFileReader::open_at(&path, 0, 0, 1024).await.unwrap();
        let (sizes, _) = collect(reader).await;
        assert!(sizes.is_empty());
    }

    #[tokio::test]
    async fn early_drop_releases_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("track.mp3");
        std::fs::write(&path, pattern(8_192)).unwrap();

        let reader = ChunkedFileReader::open_at(&path, 0, 8_192, 1024).await.unwrap();
        let mut stream = Box::pin(reader.into_stream());
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1024);
        drop(stream);

        // A fresh reader over the same file is unaffected by the dropped one
        let again = ChunkedFileReader::open_at(&path, 0, 8_192, 4_096).await.unwrap();
        let (sizes, _) = collect(again).await;
        assert_eq!(sizes, vec![4_096, 4_096]);
    }

    #[tokio::test]
    async fn missing_file_fails_to_open() {
        let temp_dir = TempDir::new().unwrap();
        let result =
            ChunkedFileReader::open_at(&temp_dir.path().join("nope.mp3"), 0, 10, 1024).await;
        assert!(result.is_err());
    }
}
