use color_eyre::Result;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Tabs,
};

use crate::{components::Component, tui::Frame};

/// Resource navigation bar. Pure view: the app owns the selected index.
#[derive(Debug, Clone)]
pub struct TabBar {
    titles: Vec<String>,
    selected: usize,
    user: Option<String>,
}

impl TabBar {
    pub fn new(titles: Vec<String>) -> Self {
        Self {
            titles,
            selected: 0,
            user: None,
        }
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select(&mut self, index: usize) {
        if index < self.titles.len() {
            self.selected = index;
        }
    }

    pub fn next(&mut self) -> usize {
        if !self.titles.is_empty() {
            self.selected = (self.selected + 1) % self.titles.len();
        }
        self.selected
    }

    pub fn prev(&mut self) -> usize {
        if !self.titles.is_empty() {
            self.selected = (self.selected + self.titles.len() - 1) % self.titles.len();
        }
        self.selected
    }

    pub fn set_user(&mut self, user: Option<String>) {
        self.user = user;
    }
}

impl Component for TabBar {
    fn height_constraint(&self) -> Constraint {
        Constraint::Length(1)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let titles = self
            .titles
            .iter()
            .enumerate()
            .map(|(i, t)| Line::from(format!("{} {}", i + 1, t)));
        let tabs = Tabs::new(titles)
            .select(self.selected)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .divider("|");
        f.render_widget(tabs, area);

        if let Some(user) = &self.user {
            let label = format!(" {user} ");
            let width = (label.chars().count() as u16).min(area.width);
            let rect = Rect {
                x: area.x + area.width.saturating_sub(width),
                y: area.y,
                width,
                height: 1,
            };
            f.render_widget(
                Line::styled(label, Style::default().fg(Color::Cyan)),
                rect,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_wraps() {
        let mut bar = TabBar::new(vec!["A".into(), "B".into(), "C".into()]);
        assert_eq!(bar.prev(), 2);
        assert_eq!(bar.next(), 0);
        assert_eq!(bar.next(), 1);
        bar.select(7);
        assert_eq!(bar.selected(), 1);
    }
}
