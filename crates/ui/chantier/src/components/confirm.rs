use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::{
    action::{Action, PopupResult},
    components::Component,
    tui::{EventResponse, Frame},
};

use super::{centered_rect_fixed, draw_popup_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Ok,
    Cancel,
}

/// Modal confirmation popup with selectable OK/Cancel buttons.
///
/// - Left/Right or Tab/BackTab: switch selected button
/// - Enter: emits `Action::PopupResult` for the selected button
/// - Esc, `n`: emits `PopupResult::Cancelled`; `y` confirms directly
///
/// The owner drops the popup when it sees the result.
#[derive(Debug, Clone)]
pub struct ConfirmPopup {
    title: String,
    question: String,
    ok_label: String,
    cancel_label: String,
    selected: Choice,
    min_width: u16,
    min_height: u16,
}

impl ConfirmPopup {
    pub fn new<T: Into<String>, Q: Into<String>>(title: T, question: Q) -> Self {
        Self {
            title: title.into(),
            question: question.into(),
            ok_label: "OK".into(),
            cancel_label: "Cancel".into(),
            selected: Choice::Cancel,
            min_width: 56,
            min_height: 8,
        }
    }

    pub fn ok_label<S: Into<String>>(mut self, label: S) -> Self {
        self.ok_label = label.into();
        self
    }

    pub fn cancel_label<S: Into<String>>(mut self, label: S) -> Self {
        self.cancel_label = label.into();
        self
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    fn confirm_action(&self) -> Action {
        match self.selected {
            Choice::Ok => Action::PopupResult(PopupResult::Confirmed),
            Choice::Cancel => Action::PopupResult(PopupResult::Cancelled),
        }
    }

    fn toggle_selection(&mut self) {
        self.selected = match self.selected {
            Choice::Ok => Choice::Cancel,
            Choice::Cancel => Choice::Ok,
        };
    }

    fn button(&self, label: &str, choice: Choice) -> Span<'static> {
        let style = if self.selected == choice {
            Style::default().fg(Color::Black).bg(Color::White).bold()
        } else {
            Style::default().fg(Color::White).bg(Color::Black)
        };
        Span::styled(format!("[ {label} ]"), style)
    }
}

impl Component for ConfirmPopup {
    fn keymap_context(&self) -> &'static str {
        "popup"
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        Some((self.min_width, self.min_height))
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let action = match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_selection();
                Some(Action::Update)
            }
            KeyCode::Enter => Some(self.confirm_action()),
            KeyCode::Char('y') => Some(Action::PopupResult(PopupResult::Confirmed)),
            KeyCode::Esc | KeyCode::Char('n') => Some(Action::PopupResult(PopupResult::Cancelled)),
            _ => Some(Action::Update),
        };
        Ok(action.map(EventResponse::Stop))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Submit => Ok(Some(self.confirm_action())),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        if area.width < 5 || area.height < 5 {
            return Ok(());
        }

        let dialog = centered_rect_fixed(area, self.min_width, self.min_height);
        let inner = draw_popup_frame(f, dialog, &self.title);

        let mut lines: Vec<Line> = self
            .question
            .lines()
            .map(|l| Line::from(Span::raw(l.to_string())))
            .collect();

        if inner.height >= 3 {
            lines.push(Line::raw(""));
        }

        let spacing = "   ";
        let buttons_len =
            (4 + self.ok_label.len()) + spacing.len() + (4 + self.cancel_label.len());
        let pad = (inner.width as usize).saturating_sub(buttons_len) / 2;
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(pad)),
            self.button(&self.ok_label, Choice::Ok),
            Span::raw(spacing),
            self.button(&self.cancel_label, Choice::Cancel),
        ]));

        if inner.height >= 4 {
            lines.push(Line::raw(""));
            lines.push(
                Line::from(vec![
                    Span::styled("←/→/Tab", Style::default().fg(Color::White)),
                    Span::raw(": Select   "),
                    Span::styled("Enter", Style::default().fg(Color::White)),
                    Span::raw(": Confirm   "),
                    Span::styled("Esc", Style::default().fg(Color::White)),
                    Span::raw(": Cancel"),
                ])
                .fg(Color::DarkGray),
            );
        }

        f.render_widget(Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true }), inner);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(popup: &mut ConfirmPopup, code: KeyCode) -> Option<Action> {
        match popup
            .handle_key_events(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
        {
            Some(EventResponse::Stop(a)) | Some(EventResponse::Continue(a)) => Some(a),
            None => None,
        }
    }

    #[test]
    fn defaults_to_cancel() {
        let mut popup = ConfirmPopup::new("Delete", "Delete Villa?");
        assert_eq!(
            press(&mut popup, KeyCode::Enter),
            Some(Action::PopupResult(PopupResult::Cancelled))
        );
    }

    #[test]
    fn toggled_enter_confirms() {
        let mut popup = ConfirmPopup::new("Delete", "Delete Villa?");
        press(&mut popup, KeyCode::Left);
        assert_eq!(
            press(&mut popup, KeyCode::Enter),
            Some(Action::PopupResult(PopupResult::Confirmed))
        );
        assert_eq!(
            press(&mut popup, KeyCode::Esc),
            Some(Action::PopupResult(PopupResult::Cancelled))
        );
        assert_eq!(
            press(&mut popup, KeyCode::Char('y')),
            Some(Action::PopupResult(PopupResult::Confirmed))
        );
    }
}
