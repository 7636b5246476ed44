//! Pagination / query-parameter calculator
//!
//! Pure, stateless helpers shared by the table controller and the REST
//! handlers: coercion of raw page/limit input, offset/limit conversion,
//! page-count math, derivation of a [`PageResult`] from a raw backend
//! payload, and the sliding page-number window used by pager widgets.

use serde::{Deserialize, Serialize};

/// First page (pages are 1-based).
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size.
pub const DEFAULT_LIMIT: u32 = 10;
/// Page sizes offered by table footers.
pub const DEFAULT_PAGE_SIZES: [u32; 5] = [5, 10, 25, 50, 100];
/// Default width of the page-number window.
pub const DEFAULT_PAGE_WINDOW: u32 = 5;

/// A validated pagination request: `page >= 1`, `limit >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Clamp-constructing variant for already-numeric input.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Coerce raw input into a valid request.
    ///
    /// Absent or sub-1 values fall back to the defaults (page 1, limit 10).
    /// Non-numeric input is expected to arrive here as `None` (failed parses
    /// are handled at the serde boundary). Never fails.
    pub fn validated(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p.min(u32::MAX as i64) as u32,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit {
            Some(l) if l >= 1 => l.min(u32::MAX as i64) as u32,
            _ => DEFAULT_LIMIT,
        };
        Self { page, limit }
    }

    /// Backend query window: `offset = (page - 1) * limit`.
    pub fn offset_limit(&self) -> OffsetLimit {
        OffsetLimit {
            offset: (self.page as u64 - 1) * self.limit as u64,
            limit: self.limit,
        }
    }
}

/// Offset/limit pair as accepted by list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetLimit {
    pub offset: u64,
    pub limit: u32,
}

/// Number of pages needed for `total` items at `limit` per page.
///
/// `total == 0` yields 0, not 1: an empty dataset has no pages.
pub fn total_pages(total: u64, limit: u32) -> u32 {
    let limit = limit.max(1) as u64;
    total.div_ceil(limit).min(u32::MAX as u64) as u32
}

/// One page of a dataset plus derived metadata.
///
/// Recomputed on demand, never mutated in place. `items` holds at most
/// `limit` rows: the slice of the filtered/sorted dataset starting at
/// `(page - 1) * limit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Item count across all pages.
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = total_pages(total, limit);
        Self {
            items,
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Derive a result from a raw backend payload.
    ///
    /// Missing `items` or `total` are treated as empty/zero; malformed
    /// payloads never fail here.
    pub fn from_raw(raw: RawPage<T>, page: u32, limit: u32) -> Self {
        Self::new(
            raw.items.unwrap_or_default(),
            raw.total.unwrap_or(0),
            page,
            limit,
        )
    }
}

/// Raw `{items, total}` payload as returned by list endpoints.
///
/// Both fields are optional so that partial or malformed responses still
/// deserialize and degrade to an empty page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPage<T> {
    pub items: Option<Vec<T>>,
    pub total: Option<u64>,
}

impl<T> Default for RawPage<T> {
    fn default() -> Self {
        Self {
            items: None,
            total: None,
        }
    }
}

/// Sliding window of page numbers for pager widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRange {
    pub pages: Vec<u32>,
    /// There are pages before the window (render a "first page" affordance).
    pub show_first: bool,
    /// There are pages after the window.
    pub show_last: bool,
    pub start_page: u32,
    pub end_page: u32,
}

/// Compute a window of up to `window_size` page numbers centered on
/// `current_page`, clamped to `[1, total_pages]`. At the boundaries the
/// window shifts inward rather than off-range; when there are fewer pages
/// than `window_size` it simply shrinks.
pub fn page_range(current_page: u32, total_pages: u32, window_size: u32) -> PageRange {
    let window = window_size.max(1) as i64;
    let current = current_page.max(1) as i64;
    let total = total_pages as i64;

    let mut start = (current - window / 2).max(1);
    let end = (start + window - 1).min(total);
    if end - start < window - 1 {
        start = (end - window + 1).max(1);
    }

    // total_pages == 0 leaves start > end: an empty window.
    let pages: Vec<u32> = (start..=end).map(|p| p as u32).collect();
    PageRange {
        show_first: start > 1,
        show_last: end < total,
        start_page: start.max(0) as u32,
        end_page: end.max(0) as u32,
        pages,
    }
}

/// Build the query-parameter list for a paginated backend request:
/// validated offset/limit plus caller filters passed through untouched.
/// Filters named `offset` or `limit` are dropped; the validated pair wins.
pub fn build_query(
    page: Option<i64>,
    limit: Option<i64>,
    filters: &[(&str, &str)],
) -> Vec<(String, String)> {
    let request = PageRequest::validated(page, limit);
    let OffsetLimit { offset, limit } = request.offset_limit();

    let mut params: Vec<(String, String)> = filters
        .iter()
        .filter(|(key, _)| *key != "offset" && *key != "limit")
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    params.push(("offset".to_string(), offset.to_string()));
    params.push(("limit".to_string(), limit.to_string()));
    params
}
