use std::fmt;

use serde_json::Value;

use super::Row;

pub type CellRenderer = Box<dyn Fn(&Row) -> String + Send + Sync>;

/// One table column: which row key it shows, how it is labelled, whether the
/// header sorts, and an optional cell renderer.
pub struct Column {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub width: Option<u16>,
    render: Option<CellRenderer>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("sortable", &self.sortable)
            .field("render", &self.render.is_some())
            .finish()
    }
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            sortable: true,
            width: None,
            render: None,
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn render(mut self, f: impl Fn(&Row) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Box::new(f));
        self
    }

    pub fn has_renderer(&self) -> bool {
        self.render.is_some()
    }

    /// Displayed text for `row`: the renderer when present, else the raw value.
    pub fn cell(&self, row: &Row) -> String {
        match &self.render {
            Some(render) => render(row),
            None => raw_cell(row.get(&self.key)),
        }
    }
}

/// Plain text of a raw value: strings verbatim, scalars formatted,
/// null/missing empty.
pub fn raw_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => if *b { "Yes" } else { "No" }.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}
