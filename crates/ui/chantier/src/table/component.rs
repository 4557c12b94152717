use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row as TableRow, Table, TableState},
};
use tui_input::{Input, InputRequest};

use crate::tui::Frame;

use super::{Column, PageItem, Row, SearchScope, TableView};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Row-level and header-level actions raised by the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Add,
    Edit(Row),
    Delete(Row),
}

/// Result of feeding a key to the table.
#[derive(Debug, Clone, PartialEq)]
pub enum TableResponse {
    Ignored,
    Handled,
    Event(TableEvent),
}

/// Searchable, sortable, paginated listing of one resource collection.
pub struct ResourceTable {
    title: String,
    columns: Vec<Column>,
    data: Vec<Row>,
    view: TableView,
    loading: bool,
    delete_enabled: bool,
    no_data_message: String,
    state: TableState,
    search_input: Input,
    searching: bool,
    sort_cursor: usize,
    spinner: usize,
}

impl ResourceTable {
    pub fn new(title: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            title: title.into(),
            columns,
            data: Vec::new(),
            view: TableView::new(),
            loading: false,
            delete_enabled: false,
            no_data_message: "No data".to_string(),
            state: TableState::default(),
            search_input: Input::default(),
            searching: false,
            sort_cursor: 0,
            spinner: 0,
        }
    }

    /// Offer the delete action on rows.
    pub fn with_delete(mut self) -> Self {
        self.delete_enabled = true;
        self
    }

    pub fn no_data_message(mut self, message: impl Into<String>) -> Self {
        self.no_data_message = message.into();
        self
    }

    pub fn search_scope(mut self, scope: SearchScope) -> Self {
        self.view = self.view.with_scope(scope);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn data(&self) -> &[Row] {
        &self.data
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn delete_enabled(&self) -> bool {
        self.delete_enabled
    }

    /// Replace the collection. The view goes back to page 1.
    pub fn set_data(&mut self, data: Vec<Row>) {
        self.data = data;
        self.view.data_changed();
        self.state.select(None);
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_search(&mut self, term: &str) {
        self.search_input = Input::new(term.to_string());
        self.view.set_search(term);
        self.state.select(None);
    }

    /// Rows currently on screen, in display order.
    pub fn visible_rows(&mut self) -> Vec<Row> {
        self.view
            .view(&self.data, &self.columns)
            .rows
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn selected_row(&mut self) -> Option<Row> {
        if self.loading {
            return None;
        }
        let index = self.state.selected()?;
        self.visible_rows().into_iter().nth(index)
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner = (self.spinner + 1) % SPINNER.len();
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible_rows().len();
        if len == 0 || self.loading {
            self.state.select(None);
            return;
        }
        let next = match self.state.selected() {
            Some(i) => (i as isize + delta).rem_euclid(len as isize) as usize,
            None => 0,
        };
        self.state.select(Some(next));
    }

    fn goto_page(&mut self, page: i64) {
        let total = self.view.view(&self.data, &self.columns).total_pages;
        self.view.set_page(page, total);
        self.state.select(None);
    }

    fn sortable_keys(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.sortable)
            .map(|(i, _)| i)
            .collect()
    }

    fn move_sort_cursor(&mut self, forward: bool) {
        let keys = self.sortable_keys();
        if keys.is_empty() {
            return;
        }
        let pos = keys.iter().position(|&i| i == self.sort_cursor);
        let next = match (pos, forward) {
            (Some(p), true) => (p + 1) % keys.len(),
            (Some(p), false) => (p + keys.len() - 1) % keys.len(),
            (None, _) => 0,
        };
        self.sort_cursor = keys[next];
    }

    /// Sort on the column under the sort cursor.
    pub fn sort_focused(&mut self) {
        if let Some(column) = self.columns.get(self.sort_cursor) {
            self.view.toggle_column(column);
        }
    }

    pub fn sort_by_key(&mut self, key: &str) {
        if let Some(column) = self.columns.iter().find(|c| c.key == key) {
            self.view.toggle_column(column);
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> TableResponse {
        let request = match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.searching = false;
                return TableResponse::Handled;
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(InputRequest::DeleteLine)
            }
            KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
            KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
            KeyCode::Delete => Some(InputRequest::DeleteNextChar),
            KeyCode::Left => Some(InputRequest::GoToPrevChar),
            KeyCode::Right => Some(InputRequest::GoToNextChar),
            KeyCode::Home => Some(InputRequest::GoToStart),
            KeyCode::End => Some(InputRequest::GoToEnd),
            _ => None,
        };
        if let Some(request) = request {
            self.search_input.handle(request);
            let term = self.search_input.value().to_string();
            self.view.set_search(term);
            self.state.select(None);
        }
        TableResponse::Handled
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> TableResponse {
        if self.searching {
            return self.handle_search_key(key);
        }
        match (key.code, key.modifiers) {
            (KeyCode::Char('/'), _) | (KeyCode::Char('f'), KeyModifiers::CONTROL) => {
                self.searching = true;
                TableResponse::Handled
            }
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.set_search("");
                TableResponse::Handled
            }
            (KeyCode::Char('a'), _) => TableResponse::Event(TableEvent::Add),
            (KeyCode::Char('e'), _) | (KeyCode::Enter, _) => match self.selected_row() {
                Some(row) => TableResponse::Event(TableEvent::Edit(row)),
                None => TableResponse::Handled,
            },
            (KeyCode::Char('d'), _) | (KeyCode::Delete, _) if self.delete_enabled => {
                match self.selected_row() {
                    Some(row) => TableResponse::Event(TableEvent::Delete(row)),
                    None => TableResponse::Handled,
                }
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => {
                self.move_selection(-1);
                TableResponse::Handled
            }
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => {
                self.move_selection(1);
                TableResponse::Handled
            }
            (KeyCode::Left, _) => {
                self.move_sort_cursor(false);
                TableResponse::Handled
            }
            (KeyCode::Right, _) => {
                self.move_sort_cursor(true);
                TableResponse::Handled
            }
            (KeyCode::Char('s'), _) => {
                self.sort_focused();
                TableResponse::Handled
            }
            (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => {
                self.goto_page(self.view.page() as i64 + 1);
                TableResponse::Handled
            }
            (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => {
                self.goto_page(self.view.page() as i64 - 1);
                TableResponse::Handled
            }
            (KeyCode::Home, _) => {
                self.goto_page(1);
                TableResponse::Handled
            }
            (KeyCode::End, _) => {
                self.goto_page(i64::MAX);
                TableResponse::Handled
            }
            _ => TableResponse::Ignored,
        }
    }

    pub fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let collapsed_border_set = symbols::border::Set {
            top_left: symbols::line::NORMAL.vertical_right,
            top_right: symbols::line::NORMAL.vertical_left,
            bottom_left: symbols::line::ROUNDED.bottom_left,
            bottom_right: symbols::line::ROUNDED.bottom_right,
            ..symbols::border::PLAIN
        };

        let [search_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(3),
        ])
        .areas(area);

        let add_hint = Span::styled(" a: Add ", Style::default().fg(Color::Black).bg(Color::Green));
        let search_block = Block::new()
            .border_type(BorderType::Rounded)
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .title(format!("─ {} ", self.title))
            .title(Line::from(add_hint).alignment(Alignment::Right));
        let search_inner = search_block.inner(search_area);
        f.render_widget(search_block, search_area);

        let input_area = Rect::new(
            search_inner.x + 1,
            search_inner.y,
            search_inner.width.saturating_sub(2),
            1,
        );
        if self.searching {
            let prompt = Line::from(vec![
                Span::styled("Search: ", Style::default().fg(Color::Yellow)),
                Span::raw(self.search_input.value().to_string()),
            ]);
            f.render_widget(Paragraph::new(prompt), input_area);
            let cursor = self.search_input.visual_cursor() as u16;
            f.set_cursor_position((input_area.x + 8 + cursor, input_area.y));
        } else {
            let text = if self.view.search().is_empty() {
                "Press / to search".to_string()
            } else {
                format!("Filter: {} [/ to edit, Ctrl+C to clear]", self.view.search())
            };
            f.render_widget(
                Paragraph::new(text).style(Style::default().fg(Color::Gray)),
                input_area,
            );
        }

        let table_block = Block::new()
            .borders(Borders::ALL)
            .border_set(collapsed_border_set);

        let slice = self.view.view(&self.data, &self.columns);
        let sort = self.view.sort().cloned();

        let header_cells: Vec<Cell> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let mut label = column.label.clone();
                if let Some(sort) = sort.as_ref().filter(|s| s.key == column.key) {
                    label = format!("{label} {}", sort.direction.arrow());
                }
                let mut style = Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD);
                if i == self.sort_cursor && column.sortable {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                Cell::from(label).style(style)
            })
            .collect();
        let header = TableRow::new(header_cells).height(1);

        let widths: Vec<Constraint> = self
            .columns
            .iter()
            .map(|c| c.width.map(Constraint::Length).unwrap_or(Constraint::Fill(1)))
            .collect();

        if self.loading {
            let inner = table_block.inner(table_area);
            f.render_widget(table_block, table_area);
            let [_, header_area, _, busy_area, _] = Layout::vertical([
                Constraint::Length(0),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(inner);
            f.render_widget(Table::new(Vec::<TableRow>::new(), widths).header(header), header_area);
            let busy = Line::from(format!("{} Loading...", SPINNER[self.spinner]))
                .fg(Color::Yellow)
                .alignment(Alignment::Center);
            f.render_widget(busy, busy_area);
        } else if slice.rows.is_empty() {
            let inner = table_block.inner(table_area);
            f.render_widget(table_block, table_area);
            let [header_area, message_area] =
                Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
            f.render_widget(Table::new(Vec::<TableRow>::new(), widths).header(header), header_area);
            let message = Line::from(self.no_data_message.clone())
                .fg(Color::DarkGray)
                .alignment(Alignment::Center);
            f.render_widget(message, message_area);
        } else {
            if let Some(selected) = self.state.selected() {
                if selected >= slice.rows.len() {
                    self.state.select(Some(slice.rows.len() - 1));
                }
            }
            let rows: Vec<TableRow> = slice
                .rows
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    let style = if i % 2 == 0 {
                        Style::default().bg(Color::Rgb(40, 40, 60))
                    } else {
                        Style::default().bg(Color::Rgb(30, 30, 40))
                    };
                    let cells: Vec<String> = self.columns.iter().map(|c| c.cell(row)).collect();
                    TableRow::new(cells).style(style).height(1)
                })
                .collect();
            let table = Table::new(rows, widths)
                .header(header)
                .block(table_block)
                .row_highlight_style(
                    Style::default()
                        .bg(Color::Blue)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("► ");
            f.render_stateful_widget(table, table_area, &mut self.state);
        }

        let [summary_area, pages_area, keys_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(footer_area);

        if !self.loading {
            f.render_widget(
                Line::from(slice.summary()).fg(Color::Gray),
                summary_area,
            );
        }
        if slice.total_pages > 1 {
            let mut spans = vec![Span::raw("Pages: ")];
            for item in slice.window() {
                match item {
                    PageItem::Page(p) if p == slice.page => spans.push(Span::styled(
                        format!("[{p}]"),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )),
                    PageItem::Page(p) => spans.push(Span::raw(format!(" {p} "))),
                    PageItem::Ellipsis => spans.push(Span::raw(" … ")),
                }
            }
            f.render_widget(Line::from(spans), pages_area);
        }

        let mut keys = vec![
            Span::styled("e/Enter", Style::default().fg(Color::White)),
            Span::raw(": Edit  "),
        ];
        if self.delete_enabled {
            keys.push(Span::styled("d", Style::default().fg(Color::White)));
            keys.push(Span::raw(": Delete  "));
        }
        keys.extend([
            Span::styled("←/→ s", Style::default().fg(Color::White)),
            Span::raw(": Sort  "),
            Span::styled("n/p", Style::default().fg(Color::White)),
            Span::raw(": Page  "),
            Span::styled("/", Style::default().fg(Color::White)),
            Span::raw(": Search"),
        ]);
        f.render_widget(Line::from(keys).fg(Color::DarkGray), keys_area);

        Ok(())
    }
}
