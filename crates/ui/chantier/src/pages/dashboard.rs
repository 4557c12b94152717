use std::sync::Arc;

use api::ResourceApi;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::{
    action::Action,
    components::{Banner, Component},
    resource::{DASHBOARD_LOAD_FAILED, DashboardStats, load_dashboard},
    tui::{Event, EventResponse, Frame},
};

use super::Page;

/// Headline figures over projects, workers, materials and transactions.
/// Re-read every time the tab is entered.
pub struct DashboardPage<A: ResourceApi> {
    api: Arc<A>,
    action_tx: Option<UnboundedSender<Action>>,
    stats: Option<DashboardStats>,
    loading: bool,
    banner: Banner,
}

impl<A: ResourceApi> DashboardPage<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            action_tx: None,
            stats: None,
            loading: false,
            banner: Banner::default(),
        }
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.message()
    }

    pub fn load(&mut self) {
        let Some(tx) = self.action_tx.clone() else {
            warn!("dashboard load requested before action handler registration");
            return;
        };
        self.loading = true;
        self.banner.set(None);
        let api = Arc::clone(&self.api);
        tokio::spawn(async move {
            let result = load_dashboard(api.as_ref()).await;
            tx.send(Action::DashboardLoaded(result)).ok();
        });
    }

    fn card(title: &str, figures: &[(&'static str, String)]) -> Paragraph<'static> {
        let lines: Vec<Line> = figures
            .iter()
            .map(|(label, value)| {
                Line::from(vec![
                    Span::styled(format!("{label:<12}"), Style::default().fg(Color::Gray)),
                    Span::styled(value.clone(), Style::default().add_modifier(Modifier::BOLD)),
                ])
            })
            .collect();
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} ")),
        )
    }
}

impl<A: ResourceApi> Page for DashboardPage<A> {
    fn name(&self) -> &str {
        "dashboard"
    }

    fn owns(&self, action: &Action) -> bool {
        matches!(action, Action::DashboardLoaded(_))
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn keymap_context(&self) -> &'static str {
        "dashboard"
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        match event {
            Event::Key(key)
                if matches!(
                    (key.code, key.modifiers),
                    (KeyCode::Char('r'), KeyModifiers::NONE) | (KeyCode::F(5), _)
                ) =>
            {
                Ok(Some(EventResponse::Stop(Action::Refresh)))
            }
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Refresh => self.load(),
            Action::DashboardLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(stats) => self.stats = Some(stats),
                    Err(err) if err.is_unauthorized() => {}
                    Err(err) => {
                        warn!(error = %err, "dashboard load failed");
                        self.banner.set(Some(DASHBOARD_LOAD_FAILED.to_string()));
                    }
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [banner_area, body] =
            Layout::vertical([self.banner.height_constraint(), Constraint::Fill(1)]).areas(area);
        self.banner.draw(frame, banner_area)?;

        let Some(stats) = self.stats else {
            let text = if self.loading { "Loading..." } else { "" };
            frame.render_widget(
                Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
                body,
            );
            return Ok(());
        };

        let figures = stats.figures();
        let [top, bottom] =
            Layout::vertical([Constraint::Length(4), Constraint::Length(5)]).areas(body);
        let [projects, workers, materials] =
            Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(top);
        frame.render_widget(Self::card("Projects", &figures[0..2]), projects);
        frame.render_widget(Self::card("Workers", &figures[2..4]), workers);
        frame.render_widget(Self::card("Materials", &figures[4..6]), materials);
        frame.render_widget(Self::card("Finances", &figures[6..9]), bottom);
        Ok(())
    }

    fn on_enter(&mut self) -> Result<()> {
        self.load();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use api::ApiError;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    use super::*;

    /// Backend that fails every read.
    struct Offline;

    impl ResourceApi for Offline {
        async fn list(&self, _path: &str) -> Result<Vec<Value>, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }

        async fn create(&self, _path: &str, _body: Value) -> Result<Option<Value>, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }

        async fn update(
            &self,
            _path: &str,
            _id: &str,
            _body: Value,
        ) -> Result<Option<Value>, ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }

        async fn delete(&self, _path: &str, _id: &str) -> Result<(), ApiError> {
            Err(ApiError::Transport("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn failed_read_shows_the_dashboard_message() {
        let mut page = DashboardPage::new(Arc::new(Offline));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        page.register_action_handler(tx).unwrap();
        page.on_enter().unwrap();
        assert!(page.is_loading());

        let action = rx.recv().await.unwrap();
        assert!(page.owns(&action));
        page.update(action).unwrap();
        assert!(!page.is_loading());
        assert_eq!(page.banner(), Some(DASHBOARD_LOAD_FAILED));
        assert_eq!(page.stats(), None);
    }

    #[test]
    fn refresh_key_reloads() {
        let mut page = DashboardPage::new(Arc::new(Offline));
        let key = crossterm::event::KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        assert_eq!(
            page.handle_events(Event::Key(key)).unwrap(),
            Some(EventResponse::Stop(Action::Refresh))
        );
    }

    #[test]
    fn resource_completions_are_not_its_own() {
        let page = DashboardPage::new(Arc::new(Offline));
        assert!(!page.owns(&Action::Refresh));
        assert!(page.owns(&Action::DashboardLoaded(Ok(DashboardStats::default()))));
    }
}
