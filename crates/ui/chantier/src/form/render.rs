use color_eyre::Result;
use ratatui::{
    layout::{Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::components::{centered_rect_fixed, draw_popup_frame};
use crate::tui::Frame;

use super::popup::display_value;
use super::{Archetype, FormPopup};

/// Vertical thumb position for a scrollbar-like indicator.
///
/// Returns `Some(y)` with `0 <= y < track_height`, or `None` when everything
/// fits (`total <= visible`) or the track is degenerate.
pub fn compute_scrollbar_thumb(
    total: usize,
    visible: usize,
    scroll: usize,
    track_height: u16,
) -> Option<usize> {
    if track_height == 0 {
        return None;
    }
    if total == 0 || visible == 0 || total <= visible {
        return None;
    }

    let max_thumb_y = track_height.saturating_sub(1) as usize;
    let denom = total.saturating_sub(visible).max(1);
    let ratio = (scroll as f32) / (denom as f32);
    let thumb_y = (ratio * (max_thumb_y as f32)).round() as usize;
    Some(thumb_y.min(max_thumb_y))
}

/// Draw the form dialog centered in `area`.
pub fn render_form_popup(popup: &mut FormPopup, f: &mut Frame<'_>, area: Rect) -> Result<()> {
    if area.width < 5 || area.height < 5 {
        return Ok(());
    }

    let (min_w, min_h) = {
        let schema = popup.form().schema();
        (schema.min_width, schema.min_height)
    };
    let dialog = centered_rect_fixed(area, min_w, min_h);
    let title = popup.form().title().to_string();
    let inner = draw_popup_frame(f, dialog, title);

    popup.set_last_inner_height(inner.height);
    popup.ensure_visible(inner.height);
    let (start, end) = popup.visible_bounds(inner.height);

    let form = popup.form();
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor: Option<Position> = None;

    if let Some(desc) = &form.schema().description {
        for l in desc.lines() {
            lines.push(Line::styled(l.to_string(), Style::default().fg(Color::Gray)));
        }
        lines.push(Line::raw(""));
    }

    for (offset, field) in form.schema().fields[start..end].iter().enumerate() {
        let focused = start + offset == popup.focused_index();
        let marker = if focused { "▶ " } else { "  " };
        let mut label = vec![
            Span::raw(marker),
            Span::styled(
                field.label.clone(),
                Style::default()
                    .fg(if field.disabled { Color::DarkGray } else { Color::White })
                    .add_modifier(if focused { Modifier::BOLD } else { Modifier::empty() }),
            ),
        ];
        if field.required {
            label.push(Span::styled(" *", Style::default().fg(Color::Red)));
        }
        lines.push(Line::from(label));

        let value = form.value(&field.name).cloned().unwrap_or_default();
        let editing_here = focused && popup.is_editing();
        let (text, style) = if editing_here {
            let raw = popup.input().value().to_string();
            let shown = if field.kind.archetype() == Archetype::Masked {
                "•".repeat(raw.chars().count())
            } else {
                raw
            };
            cursor = Some(Position::new(
                inner.x + 4 + popup.input().visual_cursor() as u16,
                inner.y + lines.len() as u16,
            ));
            (shown, Style::default().fg(Color::Black).bg(Color::White))
        } else if value.is_empty() && field.kind.is_textual() {
            (
                field.placeholder.clone().unwrap_or_default(),
                Style::default().fg(Color::DarkGray).italic(),
            )
        } else {
            let style = if focused {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Cyan)
            };
            (display_value(field, &value), style)
        };
        lines.push(Line::from(vec![Span::raw("    "), Span::styled(text, style)]));

        if let Some(err) = form.error(&field.name) {
            lines.push(Line::styled(
                format!("    {err}"),
                Style::default().fg(Color::Red),
            ));
        } else if let Some(help) = &field.help {
            lines.push(Line::styled(
                format!("    {help}"),
                Style::default().fg(Color::DarkGray),
            ));
        } else {
            lines.push(Line::raw(""));
        }
    }

    lines.push(Line::raw(""));
    let save = if form.is_submitting() {
        Span::styled(" Saving... ", Style::default().fg(Color::Black).bg(Color::Yellow))
    } else {
        Span::styled(" Ctrl+S: Save ", Style::default().fg(Color::Black).bg(Color::Green))
    };
    lines.push(
        Line::from(vec![
            save,
            Span::raw("  "),
            Span::styled("↑/↓", Style::default().fg(Color::White)),
            Span::raw(": Navigate  "),
            Span::styled("Enter", Style::default().fg(Color::White)),
            Span::raw(if popup.is_editing() { ": Confirm edit  " } else { ": Edit  " }),
            Span::styled("←/→", Style::default().fg(Color::White)),
            Span::raw(": Choose  "),
            Span::styled("Esc", Style::default().fg(Color::White)),
            Span::raw(": Cancel"),
        ])
        .fg(Color::DarkGray),
    );

    f.render_widget(Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }), inner);

    if let Some(pos) = cursor {
        if pos.y < inner.y + inner.height {
            f.set_cursor_position(pos);
        }
    }

    let total = popup.field_count();
    let visible = end.saturating_sub(start);
    if inner.width >= 1 {
        let track = Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: inner.y,
            width: 1,
            height: inner.height.saturating_sub(2),
        };
        if let Some(thumb) = compute_scrollbar_thumb(total, visible, popup.scroll(), track.height) {
            let track_lines: Vec<Line> = (0..track.height as usize)
                .map(|i| {
                    if i == thumb {
                        Line::styled("█", Style::default().fg(Color::Gray))
                    } else {
                        Line::styled("│", Style::default().fg(Color::DarkGray))
                    }
                })
                .collect();
            f.render_widget(Paragraph::new(Text::from(track_lines)), track);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FormField, FormSchema};
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn thumb_is_hidden_when_everything_fits() {
        assert_eq!(compute_scrollbar_thumb(5, 5, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(0, 3, 0, 10), None);
        assert_eq!(compute_scrollbar_thumb(10, 3, 0, 0), None);
    }

    #[test]
    fn thumb_tracks_scroll() {
        assert_eq!(compute_scrollbar_thumb(20, 5, 0, 10), Some(0));
        assert_eq!(compute_scrollbar_thumb(20, 5, 15, 10), Some(9));
        let mid = compute_scrollbar_thumb(20, 5, 7, 10).unwrap();
        assert!((3..=6).contains(&mid));
    }

    #[test]
    fn renders_labels_and_errors() {
        let mut popup = FormPopup::new(
            "Add project",
            FormSchema::new(vec![FormField::text("nom", "Project name").required()]),
        )
        .open(None);
        popup.form_mut().submit();

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                render_form_popup(&mut popup, f, area).unwrap();
            })
            .unwrap();
        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(screen.contains("Add project"));
        assert!(screen.contains("Project name"));
        assert!(screen.contains("This field is required"));
        assert!(screen.contains("Save"));
    }
}
