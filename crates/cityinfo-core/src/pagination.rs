//! Paging requests and the metadata reported alongside a page of results.

use serde::Serialize;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a client may request; larger values are clamped.
pub const MAX_PAGE_SIZE: u32 = 20;

/// A clamped, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page_number: u32,
    page_size: u32,
}

impl PageRequest {
    /// Build a page request from raw client input.
    ///
    /// `page_size` is clamped to `1..=MAX_PAGE_SIZE` and `page_number` to at least 1.
    pub fn new(page_number: i64, page_size: i64) -> Self {
        Self {
            page_number: page_number.clamp(1, u32::MAX as i64) as u32,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE as i64) as u32,
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Counters describing a paged result, serialized into the `X-Pagination` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMetadata {
    pub total_count: u64,
    pub page_size: u32,
    pub current_page: u32,
    pub total_pages: u64,
}

impl PaginationMetadata {
    pub fn new(total_count: u64, page: PageRequest) -> Self {
        Self {
            total_count,
            page_size: page.page_size,
            current_page: page.page_number,
            total_pages: total_count.div_ceil(u64::from(page.page_size)),
        }
    }
}
