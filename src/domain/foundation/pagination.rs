//! Page requests and paginated results.

use serde::{Deserialize, Serialize};

/// One-based page request with a bounded page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Clamps `page` to at least 1 and `per_page` to `1..=MAX_PER_PAGE`.
    pub fn new(page: Option<u32>, per_page: Option<u32>, default_per_page: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(default_per_page)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, 20)
    }
}

/// A page of results plus totals for the pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page.max(1));
        let last_page = u32::try_from(total.div_ceil(per_page).max(1)).unwrap_or(u32::MAX);
        Self {
            items,
            total,
            page: request.page,
            per_page: request.per_page,
            last_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            last_page: self.last_page,
        }
    }

    pub fn has_more(&self) -> bool {
        self.page < self.last_page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_clamps_bounds() {
        let req = PageRequest::new(Some(0), Some(500), 12);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, 100);

        let req = PageRequest::new(None, Some(0), 12);
        assert_eq!(req.per_page, 1);
    }

    #[test]
    fn offset_is_zero_based() {
        let req = PageRequest::new(Some(3), Some(12), 12);
        assert_eq!(req.offset(), 24);
        assert_eq!(req.limit(), 12);
    }

    #[test]
    fn page_computes_last_page() {
        let page = Page::new(vec![1, 2], 25, PageRequest::new(Some(1), Some(12), 12));
        assert_eq!(page.last_page, 3);
        assert!(page.has_more());
    }

    #[test]
    fn empty_result_has_one_page() {
        let page: Page<i32> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(page.last_page, 1);
        assert!(!page.has_more());
    }
}
