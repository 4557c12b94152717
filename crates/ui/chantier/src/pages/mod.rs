use color_eyre::Result;
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    action::Action,
    resource::ResourceKind,
    tui::{Event, EventResponse, Frame},
};

mod dashboard;
mod login;
mod resource_page;

pub use dashboard::DashboardPage;
pub use login::{LoginPage, Mode as LoginMode};
pub use resource_page::ResourcePage;

/// A `Page` composes components into one screen and owns their popups.
///
/// Pages are long-lived: they are built once at startup and keep their state
/// while other pages are shown.
pub trait Page {
    fn name(&self) -> &str;

    /// Resource whose backend events this page consumes.
    fn resource(&self) -> Option<ResourceKind> {
        None
    }

    /// Whether a backend completion belongs to this page. Completions are
    /// delivered to their owner whether or not it is the active page.
    fn owns(&self, action: &Action) -> bool {
        match action {
            Action::Resource(kind, _) => self.resource() == Some(*kind),
            _ => false,
        }
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    fn keymap_context(&self) -> &'static str {
        "page"
    }

    /// True while a text input or popup has the keyboard, so global shortcuts
    /// must not fire.
    fn captures_input(&self) -> bool {
        false
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        let _ = event;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()>;

    /// Called when the page becomes active.
    fn on_enter(&mut self) -> Result<()> {
        Ok(())
    }
}
