//! Paging parameters and paged results

use serde::{Deserialize, Serialize};

/// Hard upper bound on page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Resolved page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// 1-based
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Apply defaults and clamp: page ≥ 1, 1 ≤ limit ≤ [`MAX_PAGE_SIZE`]
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }

    /// Cut this page out of an already sorted list
    pub fn slice<T>(&self, items: Vec<T>) -> PaginatedResponse<T> {
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit as usize)
            .collect();
        PaginatedResponse::new(data, total, self.page, self.limit)
    }
}

/// Paged result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    /// Matching records across all pages
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit > 0 {
            ((total as f64) / (limit as f64)).ceil() as u32
        } else {
            1
        };

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_response() {
        let items = vec![1, 2, 3];
        let resp = PaginatedResponse::new(items, 100, 2, 10);

        assert_eq!(resp.total, 100);
        assert_eq!(resp.page, 2);
        assert_eq!(resp.total_pages, 10);
        assert!(resp.has_next);
        assert!(resp.has_prev);
    }

    #[test]
    fn test_page_request_defaults_and_clamp() {
        assert_eq!(PageRequest::new(None, None, 10), PageRequest { page: 1, limit: 10 });
        assert_eq!(PageRequest::new(Some(0), Some(500), 10).limit, MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(Some(0), Some(0), 10), PageRequest { page: 1, limit: 1 });
    }

    #[test]
    fn test_slice() {
        let page = PageRequest::new(Some(2), Some(2), 10).slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(page.data, vec![3, 4]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);

        let last = PageRequest::new(Some(3), Some(2), 10).slice(vec![1, 2, 3, 4, 5]);
        assert_eq!(last.data, vec![5]);
        assert!(!last.has_next);

        let beyond = PageRequest::new(Some(9), Some(2), 10).slice(vec![1, 2, 3]);
        assert!(beyond.data.is_empty());
    }
}
