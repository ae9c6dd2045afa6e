use serde::{Deserialize, Serialize};

pub const MAX_PAGE_SIZE: i64 = 50;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Out-of-band paging metadata, sent as JSON in the `Pagination` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationHeader {
    pub current_page: i64,
    pub items_per_page: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagingParams {
    pub page_number: i64,
    pub page_size: i64,
}

impl Default for PagingParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PagingParams {
    pub fn new(page_number: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page_number: page_number.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Rows to skip. Saturates so a page far past the end is simply empty.
    pub fn offset(&self) -> i64 {
        self.page_number
            .max(1)
            .saturating_sub(1)
            .saturating_mul(self.page_size.max(0))
    }
}

#[derive(Debug, Clone)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub current_page: i64,
    pub page_size: i64,
    pub total_count: i64,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, total_count: i64, params: PagingParams) -> Self {
        Self {
            items,
            current_page: params.page_number,
            page_size: params.page_size,
            total_count,
        }
    }

    pub fn total_pages(&self) -> i64 {
        if self.page_size <= 0 {
            return 0;
        }
        (self.total_count + self.page_size - 1) / self.page_size
    }

    pub fn header(&self) -> PaginationHeader {
        PaginationHeader {
            current_page: self.current_page,
            items_per_page: self.page_size,
            total_items: self.total_count,
            total_pages: self.total_pages(),
        }
    }
}
