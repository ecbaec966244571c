use serde::{Deserialize, Serialize};

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Query parameters shared by every list endpoint
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    DEFAULT_PER_PAGE
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageParams {
    /// Clamps out-of-range values instead of rejecting the request
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    /// Saturates instead of overflowing; an absurd page number lands on an
    /// empty page past the end rather than a negative offset.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

/// One page of results plus enough context to fetch the next one
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, params: &PageParams, total: i64) -> Self {
        Self {
            items,
            page: params.page,
            per_page: params.per_page,
            total,
        }
    }

    /// Converts the item type while keeping the paging envelope
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_low_values() {
        let params = PageParams { page: 0, per_page: -5 }.normalized();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 1);
    }

    #[test]
    fn test_normalized_caps_per_page() {
        let params = PageParams { page: 3, per_page: 500 }.normalized();
        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_offset_skips_previous_pages() {
        let params = PageParams { page: 4, per_page: 25 };
        assert_eq!(params.offset(), 75);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_offset_saturates_for_out_of_range_pages() {
        let params = PageParams { page: i64::MAX, per_page: 100 }.normalized();
        assert_eq!(params.offset(), i64::MAX);
    }

    #[test]
    fn test_offset_never_negative_for_huge_pages() {
        let params = PageParams { page: 93_000_000_000_000_000, per_page: 100 }.normalized();
        assert!(params.offset() >= 0);
    }

    #[test]
    fn test_defaults() {
        let params = PageParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, DEFAULT_PER_PAGE);
    }

    #[test]
    fn test_map_keeps_envelope() {
        let params = PageParams { page: 2, per_page: 2 };
        let page = Page::new(vec![1, 2], &params, 10).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 10);
    }
}
