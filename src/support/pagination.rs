//! Offset pagination with a one-row look-ahead.
//!
//! A page is fetched with `LIMIT page_size + 1`; the extra row only tells us
//! whether another page exists and is dropped before the page is returned.
//! This avoids a separate `COUNT(*)` query.

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    #[error("page must be >= 1")]
    PageOutOfRange,

    #[error("page_size must be between 1 and {max}, got {got}")]
    PageSizeOutOfRange { got: u32, max: u32 },
}

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32, max_page_size: u32) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange);
        }
        if page_size == 0 || page_size > max_page_size {
            return Err(PageRequestError::PageSizeOutOfRange {
                got: page_size,
                max: max_page_size,
            });
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// `LIMIT` / `OFFSET` pair for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: u64,
    pub offset: u64,
}

pub fn window(request: &PageRequest) -> PageWindow {
    let page_size = u64::from(request.page_size);
    PageWindow {
        limit: page_size + 1,
        offset: (u64::from(request.page) - 1) * page_size,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub has_next_page: bool,
}

/// Paginated response wrapper
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

/// Trims rows fetched with [`window`] down to one page.
pub fn shape<T>(mut rows: Vec<T>, request: &PageRequest) -> Page<T> {
    let page_size = request.page_size as usize;
    let has_next_page = rows.len() > page_size;
    rows.truncate(page_size);

    Page {
        items: rows,
        page_info: PageInfo {
            page: request.page,
            page_size: request.page_size,
            has_next_page,
        },
    }
}
