//! Popup rendering helpers.
//!
//! Intended usage:
//! 1) Draw the page as usual
//! 2) If a popup is active:
//!    - call `render_backdrop(frame, area)`
//!    - compute a centered rect with `centered_rect_fixed(area, width, height)`
//!    - call `draw_popup_frame(frame, popup_area, "Title")`
//!    - draw your popup content inside the same `popup_area`

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Block, Borders, Clear},
};

use crate::tui::Frame;

/// Render a modal-style backdrop that visually separates a popup from the underlying page.
/// Since terminals don't support real transparency, we simulate a dim overlay via background color.
pub fn render_backdrop(frame: &mut Frame<'_>, area: Rect) {
    let backdrop = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(backdrop, area);
}

/// Compute a centered rectangle with a fixed width/height clamped to the available `area`.
pub fn centered_rect_fixed(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);

    let x = area.x.saturating_add((area.width.saturating_sub(w)) / 2);
    let y = area.y.saturating_add((area.height.saturating_sub(h)) / 2);

    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}

/// Draw a rounded, bordered popup shell with a title at `area` and return
/// the inner drawable rect.
pub fn draw_popup_frame(frame: &mut Frame<'_>, area: Rect, title: impl Into<String>) -> Rect {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_set(symbols::border::ROUNDED)
        .style(Style::default().fg(Color::White).bg(Color::Black));

    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn centered_rect_is_clamped_and_centered() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(area, 60, 10), Rect::new(20, 15, 60, 10));
        assert_eq!(centered_rect_fixed(area, 200, 80), area);
        let offset = Rect::new(10, 5, 20, 10);
        assert_eq!(centered_rect_fixed(offset, 10, 4), Rect::new(15, 8, 10, 4));
    }
}
