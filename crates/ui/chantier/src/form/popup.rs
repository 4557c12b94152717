use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::{Map, Value};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

use super::{FieldKind, FieldValue, Form, FormField, FormSchema, RawInput};

/// Interactive form popup around the headless [`Form`] (rendering lives in
/// `render.rs`).
///
/// - Up/Down/Tab/BackTab, PageUp/PageDown, Home/End: move focus
/// - Enter: edit a text field, commit the edit, or submit on other fields
/// - Left/Right/Space: toggle checkbox, cycle select, step range
/// - Ctrl+S: submit from anywhere
/// - Esc: cancel the edit, or close the form (`Action::FormCancelled`)
pub struct FormPopup {
    form: Form,
    focused: usize,
    scroll: usize,
    editing: bool,
    input: Input,
    last_inner_height: u16,
}

impl FormPopup {
    pub fn new(title: impl Into<String>, schema: FormSchema) -> Self {
        Self {
            form: Form::new(title, schema),
            focused: 0,
            scroll: 0,
            editing: false,
            input: Input::default(),
            last_inner_height: 0,
        }
    }

    /// Open with `initial` values and focus the first enabled field.
    pub fn open(mut self, initial: Option<Map<String, Value>>) -> Self {
        self.form.open(initial);
        self.focused = self
            .form
            .schema()
            .fields
            .iter()
            .position(|f| !f.disabled)
            .unwrap_or(0);
        self.scroll = 0;
        self.editing = false;
        self.input = Input::default();
        self
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.form.set_submitting(submitting);
    }

    // --- Accessors used by the renderer --------------------------------------------------------

    pub(super) fn field_count(&self) -> usize {
        self.form.schema().fields.len()
    }

    pub(super) fn focused_index(&self) -> usize {
        self.focused
    }

    pub(super) fn scroll(&self) -> usize {
        self.scroll
    }

    pub(super) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(super) fn input(&self) -> &Input {
        &self.input
    }

    pub(super) fn set_last_inner_height(&mut self, h: u16) {
        self.last_inner_height = h;
    }

    /// Fields are three lines tall (label, value, hint/error).
    fn visible_fields(inner_height: u16) -> usize {
        let reserve = if inner_height > 8 { 4 } else { 2 };
        (inner_height.saturating_sub(reserve) / 3).max(1) as usize
    }

    pub(super) fn visible_bounds(&self, inner_height: u16) -> (usize, usize) {
        let total = self.field_count();
        if total == 0 {
            return (0, 0);
        }
        let start = self.scroll.min(total.saturating_sub(1));
        let end = (start + Self::visible_fields(inner_height)).min(total);
        (start, end)
    }

    pub(super) fn ensure_visible(&mut self, inner_height: u16) {
        let max_visible = Self::visible_fields(inner_height);
        if self.focused < self.scroll {
            self.scroll = self.focused;
        } else if self.focused >= self.scroll + max_visible {
            self.scroll = self.focused + 1 - max_visible;
        }
    }

    // --- Navigation / editing helpers -----------------------------------------------------------

    fn current_field(&self) -> Option<&FormField> {
        self.form.schema().fields.get(self.focused)
    }

    fn focus_next(&mut self) {
        if self.field_count() > 0 {
            self.focused = (self.focused + 1) % self.field_count();
        }
    }

    fn focus_prev(&mut self) {
        if self.field_count() > 0 {
            self.focused = (self.focused + self.field_count() - 1) % self.field_count();
        }
    }

    fn page_jump(&self) -> usize {
        Self::visible_fields(self.last_inner_height)
            .saturating_sub(1)
            .max(1)
    }

    fn start_editing(&mut self) {
        let Some(field) = self.current_field() else {
            return;
        };
        if field.disabled || !field.kind.is_textual() {
            return;
        }
        let existing = self
            .form
            .value(&field.name)
            .map(|v| v.as_text().into_owned())
            .unwrap_or_default();
        self.input = Input::default().with_value(existing);
        self.editing = true;
    }

    fn cancel_editing(&mut self) {
        self.editing = false;
        self.input = Input::default();
    }

    fn commit_editing(&mut self) {
        if let Some(name) = self.current_field().map(|f| f.name.clone()) {
            let value = self.input.value().to_string();
            self.form.change(&name, RawInput::Text(value));
        }
        self.cancel_editing();
    }

    /// Left/Right/Space on a non-textual field. Returns whether it applied.
    fn adjust(&mut self, dir: i32) -> bool {
        let Some(field) = self.current_field() else {
            return false;
        };
        let name = field.name.clone();
        let current = self.form.value(&name).cloned().unwrap_or_default();
        let raw = match &field.kind {
            FieldKind::Checkbox => RawInput::Checked(!current.as_bool()),
            FieldKind::Select { options } => {
                RawInput::Text(cycle_option(options, &current.as_text(), dir))
            }
            FieldKind::Range { min, max, step } => {
                let value = current.as_f64().unwrap_or(*min);
                let next = (value + step * f64::from(dir)).clamp(*min, *max);
                RawInput::Text(next.to_string())
            }
            _ => return false,
        };
        self.form.change(&name, raw)
    }

    fn submit(&mut self) -> Action {
        match self.form.submit() {
            Some(submission) => Action::FormSubmitted(submission),
            None => {
                if let Some(first) = self
                    .form
                    .schema()
                    .fields
                    .iter()
                    .position(|f| self.form.error(&f.name).is_some())
                {
                    self.focused = first;
                }
                Action::Update
            }
        }
    }
}

/// Next select value; the empty placeholder entry sits before the options.
fn cycle_option(options: &[super::SelectOption], current: &str, dir: i32) -> String {
    let mut choices = Vec::with_capacity(options.len() + 1);
    choices.push("");
    choices.extend(options.iter().map(|o| o.value.as_str()));
    let idx = choices.iter().position(|c| *c == current).unwrap_or(0) as i32;
    let next = (idx + dir).rem_euclid(choices.len() as i32) as usize;
    choices[next].to_string()
}

/// Text shown for a field's value outside of edit mode.
pub(super) fn display_value(field: &FormField, value: &FieldValue) -> String {
    match &field.kind {
        FieldKind::Password => "•".repeat(value.as_text().chars().count()),
        FieldKind::Checkbox => {
            if value.as_bool() {
                "[x] Yes".into()
            } else {
                "[ ] No".into()
            }
        }
        FieldKind::Select { options } => {
            let text = value.as_text();
            options
                .iter()
                .find(|o| o.value == text)
                .map(|o| format!("‹ {} ›", o.label))
                .unwrap_or_else(|| "‹ Select... ›".into())
        }
        FieldKind::Range { min, max, .. } => {
            let v = value.as_f64().unwrap_or(*min);
            let ratio = if max > min { (v - min) / (max - min) } else { 0.0 };
            let filled = (ratio.clamp(0.0, 1.0) * 20.0).round() as usize;
            format!("[{}{}] {}", "█".repeat(filled), "░".repeat(20 - filled), v)
        }
        _ => value.as_text().into_owned(),
    }
}

impl Component for FormPopup {
    fn keymap_context(&self) -> &'static str {
        "form"
    }

    fn popup_min_size(&self) -> Option<(u16, u16)> {
        let schema = self.form.schema();
        Some((schema.min_width, schema.min_height))
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let stop = |a: Action| Ok(Some(EventResponse::Stop(a)));

        if self.form.is_submitting() {
            return stop(Action::Update);
        }

        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if self.editing {
                self.commit_editing();
            }
            return stop(self.submit());
        }

        if self.editing {
            match key.code {
                KeyCode::Enter => self.commit_editing(),
                KeyCode::Esc => self.cancel_editing(),
                _ => {
                    self.input.handle_event(&crossterm::event::Event::Key(key));
                }
            }
            return stop(Action::Update);
        }

        match key.code {
            KeyCode::Up | KeyCode::BackTab => self.focus_prev(),
            KeyCode::Down | KeyCode::Tab => self.focus_next(),
            KeyCode::PageDown => {
                for _ in 0..self.page_jump() {
                    self.focus_next();
                }
            }
            KeyCode::PageUp => {
                for _ in 0..self.page_jump() {
                    self.focus_prev();
                }
            }
            KeyCode::Home => self.focused = 0,
            KeyCode::End => self.focused = self.field_count().saturating_sub(1),
            KeyCode::Left => {
                self.adjust(-1);
            }
            KeyCode::Right | KeyCode::Char(' ') => {
                self.adjust(1);
            }
            KeyCode::Enter => {
                if self.current_field().is_some_and(|f| f.kind.is_textual()) {
                    self.start_editing();
                } else {
                    return stop(self.submit());
                }
            }
            KeyCode::Esc => return stop(Action::FormCancelled),
            _ => {}
        }
        stop(Action::Update)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Submit => Ok(Some(self.submit())),
            _ => Ok(None),
        }
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: ratatui::layout::Rect) -> Result<()> {
        super::render::render_form_popup(self, f, area)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{REQUIRED_MESSAGE, SelectOption};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(popup: &mut FormPopup, code: KeyCode) -> Action {
        match popup.handle_key_events(key(code)).unwrap() {
            Some(EventResponse::Stop(a)) | Some(EventResponse::Continue(a)) => a,
            None => Action::Update,
        }
    }

    fn type_text(popup: &mut FormPopup, text: &str) {
        press(popup, KeyCode::Enter);
        for c in text.chars() {
            press(popup, KeyCode::Char(c));
        }
        press(popup, KeyCode::Enter);
    }

    fn worker_popup() -> FormPopup {
        FormPopup::new(
            "Add worker",
            FormSchema::new(vec![
                FormField::text("nom", "Last name").required(),
                FormField::select(
                    "metier",
                    "Trade",
                    vec![
                        SelectOption::new("macon", "Mason"),
                        SelectOption::new("plombier", "Plumber"),
                    ],
                )
                .required(),
                FormField::checkbox("disponible", "Available"),
            ]),
        )
        .open(None)
    }

    #[test]
    fn typing_and_submitting_produces_values() {
        let mut popup = worker_popup();
        type_text(&mut popup, "Diop");
        press(&mut popup, KeyCode::Down);
        press(&mut popup, KeyCode::Right);
        press(&mut popup, KeyCode::Down);
        press(&mut popup, KeyCode::Char(' '));

        match press(&mut popup, KeyCode::Enter) {
            Action::FormSubmitted(sub) => assert_eq!(
                sub.to_json(),
                json!({"nom": "Diop", "metier": "macon", "disponible": true})
            ),
            other => panic!("expected submission, got {other:?}"),
        }
    }

    #[test]
    fn failed_submit_focuses_first_error() {
        let mut popup = worker_popup();
        press(&mut popup, KeyCode::End);
        assert_eq!(press(&mut popup, KeyCode::Enter), Action::Update);
        assert_eq!(popup.focused_index(), 0);
        assert_eq!(popup.form().error("nom"), Some(REQUIRED_MESSAGE));
        assert_eq!(popup.form().error("metier"), Some(REQUIRED_MESSAGE));
    }

    #[test]
    fn select_cycles_through_placeholder() {
        let options = vec![SelectOption::new("a", "A"), SelectOption::new("b", "B")];
        assert_eq!(cycle_option(&options, "", 1), "a");
        assert_eq!(cycle_option(&options, "b", 1), "");
        assert_eq!(cycle_option(&options, "", -1), "b");
    }

    #[test]
    fn escape_cancels_edit_then_form() {
        let mut popup = worker_popup();
        press(&mut popup, KeyCode::Enter);
        press(&mut popup, KeyCode::Char('x'));
        assert_eq!(press(&mut popup, KeyCode::Esc), Action::Update);
        assert_eq!(popup.form().value("nom"), Some(&FieldValue::text("")));
        assert_eq!(press(&mut popup, KeyCode::Esc), Action::FormCancelled);
    }

    #[test]
    fn keys_are_swallowed_while_submitting() {
        let mut popup = worker_popup();
        popup.set_submitting(true);
        assert_eq!(press(&mut popup, KeyCode::Esc), Action::Update);
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(
            popup.handle_key_events(ctrl_s).unwrap(),
            Some(EventResponse::Stop(Action::Update))
        );
    }

    #[test]
    fn display_values_per_archetype() {
        let pw = FormField::password("p", "P");
        assert_eq!(display_value(&pw, &FieldValue::text("abc")), "•••");
        let cb = FormField::checkbox("c", "C");
        assert_eq!(display_value(&cb, &FieldValue::Bool(true)), "[x] Yes");
        let sel = FormField::select("s", "S", vec![SelectOption::new("a", "Alpha")]);
        assert_eq!(display_value(&sel, &FieldValue::text("")), "‹ Select... ›");
        assert_eq!(display_value(&sel, &FieldValue::text("a")), "‹ Alpha ›");
    }
}
