use std::cmp::Ordering;

use serde_json::Value;
use strum::Display;

use super::{Column, Row};

/// Rows per page.
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SortDirection {
    #[strum(to_string = "asc")]
    Ascending,
    #[strum(to_string = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

/// Which text a search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// Top-level string properties of the row only.
    #[default]
    RawStrings,
    /// Raw strings plus the text produced by column renderers.
    IncludeRendered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// One page of the filtered and sorted rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<'a> {
    pub rows: Vec<&'a Row>,
    /// Number of rows left after filtering.
    pub matched: usize,
    pub page: usize,
    pub total_pages: usize,
}

impl PageSlice<'_> {
    /// 1-based index of the first shown row, 0 when nothing is shown.
    pub fn first(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            (self.page - 1) * PAGE_SIZE + 1
        }
    }

    pub fn last(&self) -> usize {
        if self.rows.is_empty() {
            0
        } else {
            self.first() + self.rows.len() - 1
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.first(),
            self.last(),
            self.matched
        )
    }

    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.page, self.total_pages)
    }
}

/// Search, sort and page state of one table. The rows themselves are owned by
/// the caller and passed to [`TableView::view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    search: String,
    sort: Option<SortState>,
    page: usize,
    scope: SearchScope,
}

impl Default for TableView {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page: 1,
            scope: SearchScope::default(),
        }
    }
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: SearchScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }

    /// Replace the search term. Any change jumps back to page 1.
    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search {
            self.search = term;
            self.page = 1;
        }
    }

    /// Header click on `key`: a new key sorts ascending, the current key flips.
    pub fn toggle_sort(&mut self, key: &str) {
        self.sort = Some(match self.sort.take() {
            Some(current) if current.key == key => SortState {
                key: current.key,
                direction: current.direction.toggled(),
            },
            _ => SortState {
                key: key.to_string(),
                direction: SortDirection::Ascending,
            },
        });
    }

    /// Like [`TableView::toggle_sort`] but ignores columns that are not sortable.
    pub fn toggle_column(&mut self, column: &Column) {
        if column.sortable {
            self.toggle_sort(&column.key);
        }
    }

    pub fn set_sort(&mut self, sort: Option<SortState>) {
        self.sort = sort;
    }

    /// Request `page`; the result is clamped to `[1, max(total_pages, 1)]`.
    pub fn set_page(&mut self, page: i64, total_pages: usize) {
        let max = total_pages.max(1) as i64;
        self.page = page.clamp(1, max) as usize;
    }

    /// The row set was replaced.
    pub fn data_changed(&mut self) {
        self.page = 1;
    }

    /// Filter, sort and slice `data`. The stored page is re-clamped against
    /// the filtered row count.
    pub fn view<'a>(&mut self, data: &'a [Row], columns: &[Column]) -> PageSlice<'a> {
        let needle = self.search.to_lowercase();
        let mut rows: Vec<&Row> = data
            .iter()
            .filter(|row| matches_search(row, &needle, self.scope, columns))
            .collect();

        if let Some(sort) = &self.sort {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&sort.key), b.get(&sort.key));
                match sort.direction {
                    SortDirection::Ascending => ord,
                    SortDirection::Descending => ord.reverse(),
                }
            });
        }

        let matched = rows.len();
        let pages = total_pages(matched);
        self.set_page(self.page as i64, pages);

        let start = (self.page - 1) * PAGE_SIZE;
        let rows = rows.into_iter().skip(start).take(PAGE_SIZE).collect();
        PageSlice {
            rows,
            matched,
            page: self.page,
            total_pages: pages,
        }
    }
}

/// `needle` must already be lowercased. An empty needle matches every row.
pub fn matches_search(row: &Row, needle: &str, scope: SearchScope, columns: &[Column]) -> bool {
    if needle.is_empty() {
        return true;
    }
    let raw = row.values().any(|v| match v {
        Value::String(s) => s.to_lowercase().contains(needle),
        _ => false,
    });
    if raw || scope == SearchScope::RawStrings {
        return raw;
    }
    columns
        .iter()
        .filter(|c| c.has_renderer())
        .any(|c| c.cell(row).to_lowercase().contains(needle))
}

/// Ordering of two raw cell values. Numbers compare numerically, strings
/// lexicographically and booleans `false < true`. Across kinds the order is
/// booleans, numbers, strings, then everything else (null, missing, nested),
/// which all compare equal.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => Ordering::Equal,
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        Some(Value::Bool(_)) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        _ => 3,
    }
}

pub fn total_pages(rows: usize) -> usize {
    rows.div_ceil(PAGE_SIZE)
}

/// Page buttons to show: the first three, the last three and the neighbours
/// of `current`, with an ellipsis wherever numbers are skipped.
pub fn page_window(current: usize, total: usize) -> Vec<PageItem> {
    let mut items = Vec::new();
    let mut previous: Option<usize> = None;
    for p in 1..=total {
        let shown = p <= 3 || p + 3 > total || p.abs_diff(current) <= 1;
        if !shown {
            continue;
        }
        if let Some(prev) = previous {
            if p - prev > 1 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.push(PageItem::Page(p));
        previous = Some(p);
    }
    items
}
