use color_eyre::Result;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::{components::Component, tui::Frame};

/// Page-level error banner shown above the table while an error is set.
#[derive(Debug, Default, Clone)]
pub struct Banner {
    message: Option<String>,
}

impl Banner {
    pub fn set(&mut self, message: Option<String>) {
        self.message = message;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}

impl Component for Banner {
    fn height_constraint(&self) -> Constraint {
        if self.is_visible() {
            Constraint::Length(3)
        } else {
            Constraint::Length(0)
        }
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        let Some(message) = &self.message else {
            return Ok(());
        };
        let line = Line::from(vec![
            Span::styled(
                " Error ",
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(message.clone(), Style::default().fg(Color::Red)),
        ]);
        let para = Paragraph::new(line)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(para, area);
        Ok(())
    }
}
