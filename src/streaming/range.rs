use thiserror::Error;

/// Inclusive byte interval `[start, end]` of a file of `total_size` bytes.
///
/// Always satisfies `start <= end < total_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSpec {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

/// The requested range cannot be served from a file of `total_size` bytes
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Range not satisfiable for {total_size} byte file")]
pub struct RangeNotSatisfiable {
    pub total_size: u64,
}

impl RangeSpec {
    /// The whole file, or `None` for an empty file
    pub fn full(total_size: u64) -> Option<Self> {
        total_size.checked_sub(1).map(|end| RangeSpec {
            start: 0,
            end,
            total_size,
        })
    }

    /// Resolve an optional `Range` header value against a file size.
    ///
    /// An absent header yields the full interval. A present header must have
    /// the form `bytes=<start>-<end>` where a missing start means 0 and a
    /// missing end means the last byte. An end past the last byte is clamped.
    /// Anything malformed, `start > end` or `start >= total_size` is
    /// unsatisfiable.
    pub fn parse(header: Option<&str>, total_size: u64) -> Result<Self, RangeNotSatisfiable> {
        let unsatisfiable = RangeNotSatisfiable { total_size };

        let header = match header {
            Some(header) if !header.trim().is_empty() => header,
            // A blank header counts as no header
            _ => return Self::full(total_size).ok_or(unsatisfiable),
        };

        let spec = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or(unsatisfiable)?
            .trim();

        // Multiple ranges are not supported
        if spec.contains(',') {
            return Err(unsatisfiable);
        }

        let (start_raw, end_raw) = spec.split_once('-').ok_or(unsatisfiable)?;
        let start = parse_bound(start_raw).map_err(|_| unsatisfiable)?.unwrap_or(0);
        let last_byte = total_size.checked_sub(1).ok_or(unsatisfiable)?;
        let end = parse_bound(end_raw)
            .map_err(|_| unsatisfiable)?
            .map_or(last_byte, |end| end.min(last_byte));

        if start > end || start >= total_size {
            return Err(unsatisfiable);
        }

        Ok(RangeSpec {
            start,
            end,
            total_size,
        })
    }

    /// Number of bytes in the interval
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 0-999/1000000`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

impl RangeNotSatisfiable {
    /// `Content-Range` header value for a 416 response, e.g. `bytes */1000`
    pub fn content_range(&self) -> String {
        format!("bytes */{}", self.total_size)
    }
}

fn parse_bound(raw: &str) -> Result<Option<u64>, std::num::ParseIntError> {
    let raw = raw.trim();
    if raw.is_empty() {
        Ok(None)
    } else {
        raw.parse::<u64>().map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: u64 = 1_000_000;

    fn range(start: u64, end: u64) -> RangeSpec {
        RangeSpec {
            start,
            end,
            total_size: SIZE,
        }
    }

    #[test]
    fn absent_header_is_full_file() {
        assert_eq!(RangeSpec::parse(None, SIZE), Ok(range(0, SIZE - 1)));
    }

    #[test]
    fn explicit_bounds() {
        let spec = RangeSpec::parse(Some("bytes=0-999"), SIZE).unwrap();
        assert_eq!(spec, range(0, 999));
        assert_eq!(spec.content_length(), 1000);
        assert_eq!(spec.content_range(), "bytes 0-999/1000000");
    }

    #[test]
    fn missing_bounds_default_to_file_edges() {
        assert_eq!(
            RangeSpec::parse(Some("bytes=500-"), SIZE),
            Ok(range(500, SIZE - 1))
        );
        assert_eq!(RangeSpec::parse(Some("bytes=-500"), SIZE), Ok(range(0, 500)));
        assert_eq!(
            RangeSpec::parse(Some("bytes=-"), SIZE),
            Ok(range(0, SIZE - 1))
        );
    }

    #[test]
    fn end_past_last_byte_is_clamped() {
        assert_eq!(
            RangeSpec::parse(Some("bytes=10-5000000"), SIZE),
            Ok(range(10, SIZE - 1))
        );
    }

    #[test]
    fn single_byte_ranges() {
        assert_eq!(RangeSpec::parse(Some("bytes=0-0"), SIZE).unwrap().content_length(), 1);
        let last = RangeSpec::parse(Some("bytes=999999-999999"), SIZE).unwrap();
        assert_eq!(last.content_length(), 1);
        assert_eq!(last.content_range(), "bytes 999999-999999/1000000");
    }

    #[test]
    fn unsatisfiable_ranges() {
        let err = RangeNotSatisfiable { total_size: SIZE };
        for header in [
            "bytes=1000000-",
            "bytes=2000000-3000000",
            "bytes=500-100",
            "bytes=abc-def",
            "bytes=1-x",
            "bytes=0-1,5-9",
            "items=0-10",
            "bytes=10",
        ] {
            assert_eq!(RangeSpec::parse(Some(header), SIZE), Err(err), "{}", header);
        }
        assert_eq!(err.content_range(), "bytes */1000000");
    }

    #[test]
    fn blank_header_is_full_file() {
        assert_eq!(RangeSpec::parse(Some(""), SIZE), Ok(range(0, SIZE - 1)));
        assert_eq!(RangeSpec::parse(Some("  "), SIZE), Ok(range(0, SIZE - 1)));
    }

    #[test]
    fn empty_file() {
        assert_eq!(RangeSpec::full(0), None);
        assert_eq!(
            RangeSpec::parse(Some("bytes=0-"), 0),
            Err(RangeNotSatisfiable { total_size: 0 })
        );
    }
}
