//! Cursor-based pagination for list endpoints.
//!
//! The cursor is an opaque token (hex of the big-endian offset). Clients
//! must pass it back unchanged.

use serde::{Deserialize, Serialize};

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    pub cursor: Option<String>,
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Offset encoded in the cursor; 0 when absent or malformed.
    pub fn decode_offset(&self) -> u64 {
        self.cursor.as_deref().and_then(decode_cursor).unwrap_or(0)
    }

    /// Slice one page out of `items`, returning it with the next cursor.
    pub fn page<T: Clone>(&self, items: &[T]) -> (Vec<T>, PaginationMeta) {
        let offset = usize::try_from(self.decode_offset()).unwrap_or(usize::MAX);
        let count = self.effective_count();
        let page: Vec<T> = items
            .iter()
            .skip(offset)
            .take(count as usize)
            .cloned()
            .collect();
        let more = offset.saturating_add(page.len()) < items.len();
        let cursor = more.then(|| encode_cursor((offset + page.len()) as u64));
        (page, PaginationMeta { cursor })
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Cursor for the next page; absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

pub fn encode_cursor(offset: u64) -> String {
    hex::encode(offset.to_be_bytes())
}

pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let mut bytes = [0u8; 8];
    hex::decode_to_slice(cursor, &mut bytes).ok()?;
    Some(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_roundtrip() {
        for offset in [0u64, 1, 42, 100, 999, 123456789] {
            let encoded = encode_cursor(offset);
            assert_eq!(decode_cursor(&encoded), Some(offset), "roundtrip failed for {offset}");
        }
    }

    #[test]
    fn malformed_cursor_starts_from_zero() {
        let p = PaginationParams {
            cursor: Some("not-a-cursor".to_string()),
            count: None,
        };
        assert_eq!(p.decode_offset(), 0);
    }

    #[test]
    fn effective_count_defaults_and_clamps() {
        assert_eq!(PaginationParams::default().effective_count(), 100);
        let p = PaginationParams {
            cursor: None,
            count: Some(5000),
        };
        assert_eq!(p.effective_count(), 1000);
        let p = PaginationParams {
            cursor: None,
            count: Some(0),
        };
        assert_eq!(p.effective_count(), 1);
    }

    #[test]
    fn pages_walk_the_whole_list() {
        let items: Vec<u32> = (0..5).collect();
        let first = PaginationParams {
            cursor: None,
            count: Some(2),
        };
        let (page, meta) = first.page(&items);
        assert_eq!(page, vec![0, 1]);

        let second = PaginationParams {
            cursor: meta.cursor,
            count: Some(2),
        };
        let (page, meta) = second.page(&items);
        assert_eq!(page, vec![2, 3]);

        let third = PaginationParams {
            cursor: meta.cursor,
            count: Some(2),
        };
        let (page, meta) = third.page(&items);
        assert_eq!(page, vec![4]);
        assert!(meta.cursor.is_none());
    }

    #[test]
    fn exact_final_page_has_no_cursor() {
        let items: Vec<u32> = (0..4).collect();
        let p = PaginationParams {
            cursor: Some(encode_cursor(2)),
            count: Some(2),
        };
        let (page, meta) = p.page(&items);
        assert_eq!(page, vec![2, 3]);
        assert!(meta.cursor.is_none());
    }
}
