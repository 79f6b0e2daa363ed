use serde::Serialize;

/// One window over the track collection
///
/// `items` is `None` (serialized as `null`) when the window is empty, and
/// `next_offset` is only set while more items remain past this window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    #[serde(rename = "tracks")]
    pub items: Option<Vec<T>>,
    pub next_offset: Option<u64>,
}

impl<T> Page<T> {
    /// Map the items of the window, keeping the paging fields
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            offset: self.offset,
            limit: self.limit,
            items: self.items.map(|items| items.into_iter().map(f).collect()),
            next_offset: self.next_offset,
        }
    }
}

/// Build a page from a window fetched at `offset`/`limit` out of `total` items
pub fn paginate<T>(window: Vec<T>, offset: u64, limit: u64, total: u64) -> Page<T> {
    let next_offset = offset.checked_add(limit).filter(|next| *next < total);
    let items = if total == 0 || window.is_empty() {
        None
    } else {
        Some(window)
    };

    Page {
        total,
        offset,
        limit,
        items,
        next_offset,
    }
}
