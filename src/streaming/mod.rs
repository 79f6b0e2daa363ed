//! Range-aware audio streaming from files on disk

mod range;
mod reader;
mod response;

pub use range::{RangeNotSatisfiable, RangeSpec};
pub use reader::{ChunkedFileReader, DEFAULT_CHUNK_SIZE};
pub use response::{stream_file, StreamError, AUDIO_CONTENT_TYPE};
