//! Dataset view controller
//!
//! Owns one table's view state (search term, sort axis, page window) and
//! derives the visible page from the full dataset on demand. The pipeline
//! is always filter → sort → paginate, and the derived page is never
//! cached: every [`TableController::current_view`] call recomputes it from
//! the dataset and the current axes.
//!
//! Dataset loads are asynchronous and may overlap; [`FetchTicket`]s make
//! the last *issued* fetch the only one that can land. See
//! [`TableController::begin_fetch`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::column::{Column, SortSpec};
use super::pagination::{self, PageRange, PageRequest, PageResult, DEFAULT_PAGE_WINDOW};
use super::row::TableRow;

/// Rows matching the search term, in dataset order.
///
/// The match is a case-insensitive substring test over the given keys; a
/// row qualifies when any key matches. An empty term keeps every row.
pub fn filter_rows<'a, R: TableRow>(rows: &'a [R], search: &str, keys: &[String]) -> Vec<&'a R> {
    if search.is_empty() {
        return rows.iter().collect();
    }
    let needle = search.to_lowercase();
    rows.iter()
        .filter(|row| {
            keys.iter()
                .any(|key| row.cell(key).display().to_lowercase().contains(&needle))
        })
        .collect()
}

/// Sort rows in place by the given axis.
///
/// The sort is stable: rows whose cells compare equal (including rows that
/// lack the key entirely) keep their relative dataset order. An inactive
/// spec leaves the slice untouched.
pub fn sort_rows<R: TableRow>(rows: &mut [&R], spec: &SortSpec) {
    let Some(key) = spec.key.as_deref() else {
        return;
    };
    let descending = spec.order == super::column::SortOrder::Desc;
    rows.sort_by(|a, b| {
        let ordering = a.cell(key).compare(&b.cell(key));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

/// Slice one page out of `rows` and wrap it with pagination metadata.
///
/// A page beyond the end of the dataset yields empty `items` with the
/// metadata still describing the full dataset.
pub fn paginate<R: Clone>(rows: &[R], request: PageRequest) -> PageResult<R> {
    let total = rows.len() as u64;
    let window = request.offset_limit();
    let start = (window.offset as usize).min(rows.len());
    let end = (start + window.limit as usize).min(rows.len());
    PageResult::new(rows[start..end].to_vec(), total, request.page, request.limit)
}

/// Ticket identifying one dataset fetch. Tickets are issued in order and
/// compared by issuance, never by completion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was the newest one and was applied.
    Applied,
    /// A newer fetch was issued meanwhile; the response was discarded.
    Stale,
}

/// View state for one dataset.
///
/// All mutators that change which rows are visible (`set_search`,
/// `toggle_sort`, `set_sort`, `set_limit`, `set_filter_keys`) snap the
/// page back to 1; the old page number is meaningless against the new
/// row set. Only `set_page` moves within the current axes.
pub struct TableController<R> {
    columns: Vec<Column<R>>,
    rows: Vec<R>,
    /// Keys the search term is matched against; `None` means all columns.
    filter_keys: Option<Vec<String>>,
    search: String,
    sort: SortSpec,
    request: PageRequest,
    loading: bool,
    error: Option<String>,
    /// Issuance counter; the ticket equal to it is the only live one.
    latest_ticket: u64,
}

impl<R: TableRow> TableController<R> {
    pub fn new(columns: Vec<Column<R>>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            filter_keys: None,
            search: String::new(),
            sort: SortSpec::none(),
            request: PageRequest::default(),
            loading: false,
            error: None,
            latest_ticket: 0,
        }
    }

    /// Restrict the search to specific keys (default: every column key).
    pub fn with_filter_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_rows(mut self, rows: Vec<R>) -> Self {
        self.rows = rows;
        self
    }

    // ── Mutators ──

    /// Replace the search term and snap back to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
        self.request.page = 1;
    }

    /// Header click: cycle the sort axis and snap back to page 1.
    ///
    /// Clicks on a column marked unsortable are ignored entirely; the page
    /// does not reset either, since nothing changed.
    pub fn toggle_sort(&mut self, key: &str) {
        let sortable = self
            .columns
            .iter()
            .find(|column| column.key == key)
            .map(|column| column.sortable)
            .unwrap_or(true);
        if !sortable {
            return;
        }
        self.sort = self.sort.toggled(key);
        self.request.page = 1;
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.request.page = 1;
    }

    /// Change the page size and snap back to page 1.
    pub fn set_limit(&mut self, limit: u32) {
        self.request = PageRequest::new(1, limit);
    }

    pub fn set_filter_keys<I, S>(&mut self, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_keys = Some(keys.into_iter().map(Into::into).collect());
        self.request.page = 1;
    }

    /// Move within the current axes. Pages are 1-based; sub-1 input clamps.
    pub fn set_page(&mut self, page: u32) {
        self.request.page = page.max(1);
    }

    // ── Fetch lifecycle ──

    /// Start a dataset load: issues a new ticket and raises the loading
    /// flag. Issuing again before completion supersedes the older ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.loading = true;
        FetchTicket(self.latest_ticket)
    }

    /// Land a fetch. Responses for superseded tickets, successes and
    /// failures alike, are discarded without touching any state.
    ///
    /// A live success replaces the dataset and clears any previous error;
    /// a live failure keeps the dataset and records the error. Both clear
    /// the loading flag.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<Vec<R>, String>,
    ) -> FetchOutcome {
        if ticket.0 != self.latest_ticket {
            debug!(
                ticket = ticket.0,
                latest = self.latest_ticket,
                "Discarding superseded fetch response"
            );
            return FetchOutcome::Stale;
        }
        self.loading = false;
        match outcome {
            Ok(rows) => {
                self.rows = rows;
                self.error = None;
            }
            Err(message) => {
                self.error = Some(message);
            }
        }
        FetchOutcome::Applied
    }

    // ── Derived views ──

    fn effective_filter_keys(&self) -> Vec<String> {
        match &self.filter_keys {
            Some(keys) => keys.clone(),
            None => self.columns.iter().map(|c| c.key.clone()).collect(),
        }
    }

    /// The visible page: filter → sort → paginate over the full dataset.
    pub fn current_view(&self) -> PageResult<R>
    where
        R: Clone,
    {
        let keys = self.effective_filter_keys();
        let mut matched = filter_rows(&self.rows, &self.search, &keys);
        sort_rows(&mut matched, &self.sort);

        let total = matched.len() as u64;
        let window = self.request.offset_limit();
        let start = (window.offset as usize).min(matched.len());
        let end = (start + window.limit as usize).min(matched.len());
        let items = matched[start..end].iter().map(|row| (*row).clone()).collect();
        PageResult::new(items, total, self.request.page, self.request.limit)
    }

    /// The visible page with every cell pushed through its column's
    /// renderer: one `Vec<String>` per row, in column order.
    pub fn rendered_view(&self) -> PageResult<Vec<String>>
    where
        R: Clone,
    {
        let view = self.current_view();
        let items = view
            .items
            .iter()
            .map(|row| self.columns.iter().map(|c| c.rendered(row)).collect())
            .collect();
        PageResult::new(items, view.total, view.page, view.limit)
    }

    /// Pager window over the filtered dataset.
    pub fn pager(&self, window_size: Option<u32>) -> PageRange {
        let keys = self.effective_filter_keys();
        let matched = filter_rows(&self.rows, &self.search, &keys).len() as u64;
        let total_pages = pagination::total_pages(matched, self.request.limit);
        pagination::page_range(
            self.request.page,
            total_pages,
            window_size.unwrap_or(DEFAULT_PAGE_WINDOW),
        )
    }

    /// Query parameters mirroring the current axes, for callers that page
    /// on the server instead: `offset`/`limit` always, `sortBy`/`sortOrder`
    /// when a sort is active, `q` when a search term is set.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let window = self.request.offset_limit();
        let mut params = vec![
            ("offset".to_string(), window.offset.to_string()),
            ("limit".to_string(), window.limit.to_string()),
        ];
        if let Some(key) = &self.sort.key {
            params.push(("sortBy".to_string(), key.clone()));
            params.push(("sortOrder".to_string(), self.sort.order.to_string()));
        }
        if !self.search.is_empty() {
            params.push(("q".to_string(), self.search.clone()));
        }
        params
    }

    // ── Accessors ──

    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page_request(&self) -> PageRequest {
        self.request
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Serializable snapshot of a controller's axes, e.g. for persisting the
/// view a user had open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub search: String,
    pub sort: SortSpec,
    pub page: u32,
    pub limit: u32,
}

impl<R: TableRow> TableController<R> {
    pub fn view_state(&self) -> ViewState {
        ViewState {
            search: self.search.clone(),
            sort: self.sort.clone(),
            page: self.request.page,
            limit: self.request.limit,
        }
    }

    /// Restore previously saved axes verbatim (no page reset: the state was
    /// captured against the same dataset shape).
    pub fn restore_view_state(&mut self, state: ViewState) {
        self.search = state.search;
        self.sort = state.sort;
        self.request = PageRequest::new(state.page, state.limit);
    }
}
