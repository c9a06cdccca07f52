//! Page-based slicing of in-memory result sets

use serde::Serialize;
use std::env;

/// Paging limits
#[derive(Debug, Clone, Copy)]
pub struct PagingConfig {
    /// Page size used when the caller does not ask for one
    pub default_page_size: usize,
    /// Upper bound for any requested page size
    pub max_page_size: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PagingConfig {
    /// Create a new PagingConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DEFAULT_PAGE_SIZE`: page size when none is requested (default: 10)
    /// - `MAX_PAGE_SIZE`: largest page size a caller may request (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let default_page_size = env::var("DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_page_size);

        let max_page_size = env::var("MAX_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_page_size);

        Self {
            default_page_size,
            max_page_size,
        }
    }

    /// Turn optional caller input into a clamped page request. Zero or
    /// negative values clamp up to 1.
    pub fn request(&self, page: Option<i64>, limit: Option<i64>) -> PageRequest {
        PageRequest::new(
            page.map_or(1, at_least_one),
            limit.map_or(self.default_page_size, at_least_one),
        )
        .clamped(self.max_page_size)
    }
}

fn at_least_one(value: i64) -> usize {
    usize::try_from(value.max(1)).unwrap_or(usize::MAX)
}

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// Clamp `page` to at least 1 and `limit` to `[1, max_page_size]`
    pub fn clamped(self, max_page_size: usize) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, max_page_size.max(1)),
        }
    }
}

/// Pagination metadata returned alongside a page of data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Slice an already filtered and sorted item list into the requested page.
/// Pages past the end yield an empty `data` rather than an error.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let page = request.page.max(1);
    let limit = request.limit.max(1);
    let total = items.len();
    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit);

    let data = items.into_iter().skip(start).take(limit).collect();

    Page {
        data,
        pagination: Pagination {
            current_page: page,
            total_pages: total.div_ceil(limit),
            total_items: total,
            items_per_page: limit,
            has_next_page: end < total,
            has_prev_page: page > 1,
        },
    }
}
