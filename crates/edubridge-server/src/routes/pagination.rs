//! Page-number pagination for the notification feed.

use std::ops::Range;

use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{Result, ServerError};

/// Default page size.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct PageParams {
    /// Number of items on each page (default: 10, must be at least 1).
    #[serde(default = "default_items_per_page")]
    #[param(minimum = 1, default = 10)]
    pub items_per_page: usize,

    /// Zero-based page number.
    #[serde(default)]
    #[param(minimum = 0, default = 0)]
    pub page: usize,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            page: 0,
        }
    }
}

impl PageParams {
    pub fn new(items_per_page: usize, page: usize) -> Self {
        Self {
            items_per_page,
            page,
        }
    }

    /// Half-open index range `[page * items_per_page, page * items_per_page + items_per_page)`.
    ///
    /// Bounds saturate at `usize::MAX`, so an absurdly large page is simply
    /// past the end of any feed.
    pub fn range(&self) -> Result<Range<usize>> {
        if self.items_per_page == 0 {
            return Err(ServerError::BadRequest(
                "items_per_page must be at least 1".to_string(),
            ));
        }

        let start = self.page.saturating_mul(self.items_per_page);
        Ok(start..start.saturating_add(self.items_per_page))
    }

    /// The items of this page, clamped to the end of `items`.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> Result<&'a [T]> {
        let range = self.range()?;
        let start = range.start.min(items.len());
        let end = range.end.min(items.len());
        Ok(&items[start..end])
    }
}

fn default_items_per_page() -> usize {
    DEFAULT_ITEMS_PER_PAGE
}
