//! Schema-driven table.
//!
//! [`TableView`] is the headless search → sort → paginate pipeline over a row
//! slice; [`ResourceTable`] wraps it with key handling and ratatui rendering.

mod column;
mod component;
mod view;

pub use column::{CellRenderer, Column, raw_cell};
pub use component::{ResourceTable, TableEvent, TableResponse};
pub use view::{
    PAGE_SIZE, PageItem, PageSlice, SearchScope, SortDirection, SortState, TableView,
    compare_values, matches_search, page_window, total_pages,
};

/// One record of a resource collection as returned by the backend.
pub type Row = serde_json::Map<String, serde_json::Value>;
