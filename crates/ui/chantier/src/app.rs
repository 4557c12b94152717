use std::sync::Arc;

use api::{ApiClient, SessionEvent};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::{
    action::{Action, PopupResult},
    components::{Component, ConfirmPopup, TabBar, render_backdrop},
    config::Config,
    pages::{DashboardPage, LoginPage, Page, ResourcePage},
    resource::ResourceKind,
    tui::{Event, EventResponse, Frame, Tui},
};

pub struct App {
    pub config: Config,
    client: Arc<ApiClient>,
    session_rx: Option<UnboundedReceiver<SessionEvent>>,
    login: LoginPage,
    pages: Vec<Box<dyn Page>>,
    tabs: TabBar,
    active_page: usize,
    authenticated: bool,
    /// Set when the session expired under a mounted page; the next login
    /// re-reads the active collection.
    stale: bool,
    popup: Option<ConfirmPopup>,
    should_quit: bool,
    should_suspend: bool,
}

impl App {
    pub fn new(
        config: Config,
        client: ApiClient,
        session_rx: UnboundedReceiver<SessionEvent>,
        initial: Option<ResourceKind>,
    ) -> Self {
        let client = Arc::new(client);
        let kinds = ResourceKind::all();
        let mut pages: Vec<Box<dyn Page>> = vec![Box::new(DashboardPage::new(Arc::clone(&client)))];
        pages.extend(
            kinds
                .iter()
                .map(|kind| Box::new(ResourcePage::new(*kind, Arc::clone(&client))) as Box<dyn Page>),
        );
        let mut tabs = TabBar::new(
            std::iter::once("Dashboard".to_string())
                .chain(kinds.iter().map(ToString::to_string))
                .collect(),
        );
        // The dashboard is the first tab, resources follow in catalogue order.
        let active_page = initial
            .and_then(|kind| kinds.iter().position(|k| *k == kind))
            .map_or(0, |index| index + 1);
        tabs.select(active_page);

        let session = client.credentials().session();
        tabs.set_user(session.as_ref().and_then(|s| s.display_name()));

        Self {
            config,
            login: LoginPage::new(Arc::clone(&client)),
            client,
            session_rx: Some(session_rx),
            pages,
            tabs,
            active_page,
            authenticated: session.is_some(),
            stale: false,
            popup: None,
            should_quit: false,
            should_suspend: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn active_page(&self) -> usize {
        self.active_page
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn is_confirming_quit(&self) -> bool {
        self.popup.is_some()
    }

    /// Hand the action sender to every page and bridge session events into
    /// the action stream.
    pub fn register(&mut self, action_tx: UnboundedSender<Action>) -> Result<()> {
        self.login.register_action_handler(action_tx.clone())?;
        for page in self.pages.iter_mut() {
            page.register_action_handler(action_tx.clone())?;
        }
        if let Some(mut session_rx) = self.session_rx.take() {
            let tx = action_tx.clone();
            tokio::spawn(async move {
                while let Some(SessionEvent::Expired) = session_rx.recv().await {
                    if tx.send(Action::SessionExpired).is_err() {
                        break;
                    }
                }
            });
        }
        if self.authenticated {
            self.enter_active()?;
        }
        Ok(())
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

        let mut tui = self.tui()?;
        tui.enter()?;
        self.register(action_tx.clone())?;

        loop {
            if let Some(e) = tui.next().await {
                self.handle_event(e, &action_tx)?;
            }

            while let Ok(action) = action_rx.try_recv() {
                match action {
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.draw(&mut tui, &action_tx)?;
                    }
                    Action::Render => self.draw(&mut tui, &action_tx)?,
                    action => self.update(action, &action_tx)?,
                }
            }

            if self.should_suspend {
                tui.suspend()?;
                action_tx.send(Action::Resume)?;
                tui = self.tui()?;
                tui.enter()?;
            } else if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn tui(&self) -> Result<Tui> {
        Ok(Tui::new()?
            .tick_rate(self.config.tick_rate)
            .frame_rate(self.config.frame_rate)
            .paste(true))
    }

    fn draw(&mut self, tui: &mut Tui, action_tx: &UnboundedSender<Action>) -> Result<()> {
        tui.draw(|f| {
            if let Err(err) = self.render(f) {
                action_tx
                    .send(Action::Error(format!("Failed to draw: {err:?}")))
                    .ok();
            }
        })?;
        Ok(())
    }

    fn captures_input(&self) -> bool {
        self.popup.is_some()
            || !self.authenticated
            || self
                .pages
                .get(self.active_page)
                .is_some_and(|page| page.captures_input())
    }

    /// Route one terminal event: quit popup, then the login boundary or the
    /// active page, then the global shortcuts.
    pub fn handle_event(&mut self, event: Event, action_tx: &UnboundedSender<Action>) -> Result<()> {
        match event {
            Event::Quit => return Ok(action_tx.send(Action::Quit)?),
            Event::Tick => return Ok(action_tx.send(Action::Tick)?),
            Event::Render => return Ok(action_tx.send(Action::Render)?),
            Event::Resize(x, y) => return Ok(action_tx.send(Action::Resize(x, y))?),
            Event::Key(key) if is_ctrl(key, 'q') => {
                return Ok(action_tx.send(Action::Quit)?);
            }
            _ => {}
        }

        let response = if let Some(popup) = self.popup.as_mut() {
            popup.handle_events(event.clone())?
        } else if !self.authenticated {
            self.login.handle_events(event.clone())?
        } else if let Some(page) = self.pages.get_mut(self.active_page) {
            page.handle_events(event.clone())?
        } else {
            None
        };
        let stop = match response {
            Some(EventResponse::Continue(action)) => {
                action_tx.send(action)?;
                false
            }
            Some(EventResponse::Stop(action)) => {
                action_tx.send(action)?;
                true
            }
            None => false,
        };

        if !stop && !self.captures_input() {
            if let Event::Key(key) = event {
                if let Some(action) = global_action(key) {
                    action_tx.send(action)?;
                }
            }
        }
        Ok(())
    }

    pub fn update(&mut self, action: Action, action_tx: &UnboundedSender<Action>) -> Result<()> {
        if !matches!(action, Action::Tick | Action::Render | Action::Update) {
            debug!(%action, "action");
        }
        match action {
            Action::Quit => self.should_quit = true,
            Action::RequestQuit => {
                self.popup = Some(
                    ConfirmPopup::new("Quit", "Quit chantier?")
                        .ok_label("Quit")
                        .cancel_label("Stay"),
                );
            }
            Action::PopupResult(result) if self.popup.is_some() => {
                self.popup = None;
                if result == PopupResult::Confirmed {
                    self.should_quit = true;
                }
            }
            Action::Suspend => self.should_suspend = true,
            Action::Resume => self.should_suspend = false,
            Action::NextTab if self.authenticated => {
                let next = self.tabs.next();
                self.select_page(next)?;
            }
            Action::PrevTab if self.authenticated => {
                let prev = self.tabs.prev();
                self.select_page(prev)?;
            }
            Action::Navigate(index) if self.authenticated && index < self.pages.len() => {
                self.tabs.select(index);
                self.select_page(index)?;
            }
            Action::LoggedIn(session) => {
                self.tabs.set_user(session.display_name());
                self.authenticated = true;
                self.login.update(Action::LoggedIn(session))?;
                if std::mem::take(&mut self.stale) {
                    self.forward(Action::Refresh, action_tx)?;
                } else {
                    self.enter_active()?;
                }
            }
            Action::SessionExpired if self.authenticated => {
                info!("session expired, back to login");
                self.authenticated = false;
                self.stale = true;
                self.tabs.set_user(None);
                self.login.update(Action::SessionExpired)?;
            }
            Action::Logout => {
                if let Err(err) = self.client.logout() {
                    warn!(error = %err, "unable to clear stored session");
                }
                info!("logged out");
                self.authenticated = false;
                self.stale = true;
                self.tabs.set_user(None);
                self.login.reset(None);
            }
            action @ (Action::Resource(..) | Action::DashboardLoaded(_)) => {
                if let Some(page) = self.pages.iter_mut().find(|page| page.owns(&action)) {
                    if let Some(next) = page.update(action)? {
                        action_tx.send(next)?;
                    }
                }
            }
            Action::Error(message) => error!("{message}"),
            action @ (Action::LoginFailed(_)
            | Action::FormSubmitted(_)
            | Action::FormCancelled
            | Action::PopupResult(_)
            | Action::Refresh
            | Action::Tick) => self.forward(action, action_tx)?,
            _ => {}
        }
        Ok(())
    }

    /// Deliver to whichever surface has the keyboard.
    fn forward(&mut self, action: Action, action_tx: &UnboundedSender<Action>) -> Result<()> {
        let next = if !self.authenticated {
            self.login.update(action)?
        } else if let Some(page) = self.pages.get_mut(self.active_page) {
            page.update(action)?
        } else {
            None
        };
        if let Some(next) = next {
            action_tx.send(next)?;
        }
        Ok(())
    }

    fn select_page(&mut self, index: usize) -> Result<()> {
        self.active_page = index;
        self.enter_active()
    }

    fn enter_active(&mut self) -> Result<()> {
        match self.pages.get_mut(self.active_page) {
            Some(page) => page.on_enter(),
            None => Ok(()),
        }
    }

    pub fn render(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        let area = frame.area();
        if !self.authenticated {
            self.login.draw(frame, area)?;
        } else {
            let [tabs_area, page_area, footer_area] = Layout::vertical([
                self.tabs.height_constraint(),
                Constraint::Fill(1),
                Constraint::Length(1),
            ])
            .areas(area);
            self.tabs.draw(frame, tabs_area)?;
            if let Some(page) = self.pages.get_mut(self.active_page) {
                page.draw(frame, page_area)?;
                let hints = footer_hints(page.keymap_context());
                frame.render_widget(
                    Paragraph::new(Line::from(hints)).style(Style::default().fg(Color::DarkGray)),
                    footer_area,
                );
            }
        }

        if let Some(popup) = self.popup.as_mut() {
            render_backdrop(frame, area);
            popup.draw(frame, area)?;
        }
        Ok(())
    }
}

fn is_ctrl(key: KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Shortcuts available while no input or popup has the keyboard.
fn global_action(key: KeyEvent) -> Option<Action> {
    if is_ctrl(key, 'z') {
        return Some(Action::Suspend);
    }
    match key.code {
        KeyCode::Char('q') => Some(Action::RequestQuit),
        KeyCode::Tab | KeyCode::Char(']') => Some(Action::NextTab),
        KeyCode::BackTab | KeyCode::Char('[') => Some(Action::PrevTab),
        KeyCode::Char('L') => Some(Action::Logout),
        KeyCode::Char(c @ '1'..='9') => c
            .to_digit(10)
            .map(|d| Action::Navigate(d as usize - 1)),
        _ => None,
    }
}

fn footer_hints(context: &str) -> &'static str {
    match context {
        "table" | "dashboard" => " 1-8/Tab: Switch  r: Refresh  L: Log out  q: Quit",
        "search" => " Type to filter  Enter/Esc: Done  Ctrl+U: Clear",
        "form" => " Tab/↑↓: Move  Enter: Edit  Ctrl+S: Save  Esc: Close",
        "confirm" => " y: Yes  n/Esc: No  ←/→: Select",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use api::{ClientOptions, CredentialStore, Session};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};
    use serde_json::json;

    use super::*;

    fn app(logged_in: bool) -> (App, UnboundedSender<SessionEvent>) {
        let credentials = CredentialStore::in_memory();
        if logged_in {
            credentials
                .store(Session {
                    token: "jwt".into(),
                    user: Some(json!({"prenom": "Awa", "nom": "Diop"})),
                })
                .unwrap();
        }
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let client = ApiClient::new(
            ClientOptions {
                base_url: "http://127.0.0.1:9".into(),
                ..Default::default()
            },
            credentials,
        )
        .unwrap()
        .with_session_events(session_tx.clone());
        (
            App::new(Config::default(), client, session_rx, Some(ResourceKind::Materials)),
            session_tx,
        )
    }

    /// Skip the completions of the loads spawned on registration.
    async fn next_matching(
        rx: &mut UnboundedReceiver<Action>,
        wanted: impl Fn(&Action) -> bool,
    ) -> Action {
        loop {
            let action = rx.recv().await.unwrap();
            if wanted(&action) {
                return action;
            }
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.render(f).unwrap()).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn starts_on_login_without_session() {
        let (mut app, _session) = app(false);
        let (tx, _rx) = mpsc::unbounded_channel();
        app.register(tx).unwrap();
        assert!(!app.is_authenticated());
        assert!(screen(&mut app).contains("Sign in"));
    }

    #[tokio::test]
    async fn digits_switch_tabs() {
        let (mut app, _session) = app(true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.register(tx.clone()).unwrap();
        assert_eq!(app.active_page(), 3);

        app.handle_event(key(KeyCode::Char('2')), &tx).unwrap();
        let action = next_matching(&mut rx, |a| matches!(a, Action::Navigate(_))).await;
        assert_eq!(action, Action::Navigate(1));
        app.update(action, &tx).unwrap();
        assert_eq!(app.active_page(), 1);
        assert!(screen(&mut app).contains("Projects list"));

        app.handle_event(key(KeyCode::Char('1')), &tx).unwrap();
        let action = next_matching(&mut rx, |a| matches!(a, Action::Navigate(_))).await;
        app.update(action, &tx).unwrap();
        assert_eq!(app.active_page(), 0);
        assert!(screen(&mut app).contains("Loading..."));

        let loaded = next_matching(&mut rx, |a| matches!(a, Action::DashboardLoaded(_))).await;
        app.update(loaded, &tx).unwrap();
        assert!(screen(&mut app).contains(crate::resource::DASHBOARD_LOAD_FAILED));
    }

    #[tokio::test]
    async fn quit_asks_for_confirmation() {
        let (mut app, _session) = app(true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.register(tx.clone()).unwrap();

        app.handle_event(key(KeyCode::Char('q')), &tx).unwrap();
        let request = next_matching(&mut rx, |a| *a == Action::RequestQuit).await;
        app.update(request, &tx).unwrap();
        assert!(app.is_confirming_quit());
        assert!(!app.should_quit());

        app.handle_event(key(KeyCode::Char('y')), &tx).unwrap();
        let result = next_matching(&mut rx, |a| matches!(a, Action::PopupResult(_))).await;
        app.update(result, &tx).unwrap();
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn expired_session_returns_to_login() {
        let (mut app, session) = app(true);
        let (tx, mut rx) = mpsc::unbounded_channel();
        app.register(tx.clone()).unwrap();
        session.send(SessionEvent::Expired).unwrap();

        let expired = next_matching(&mut rx, |a| *a == Action::SessionExpired).await;
        app.update(expired, &tx).unwrap();
        assert!(!app.is_authenticated());
        assert!(screen(&mut app).contains("Session expired, please log in again."));
    }

    #[test]
    fn global_shortcuts() {
        let press = |code| global_action(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(press(KeyCode::Char('7')), Some(Action::Navigate(6)));
        assert_eq!(press(KeyCode::Char('0')), None);
        assert_eq!(press(KeyCode::BackTab), Some(Action::PrevTab));
        assert_eq!(
            global_action(KeyEvent::new(KeyCode::Char('z'), KeyModifiers::CONTROL)),
            Some(Action::Suspend)
        );
    }
}
