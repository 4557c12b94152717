use std::sync::Arc;

use api::ApiClient;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::{
    account,
    action::Action,
    components::{Banner, Component},
    form::{FormPopup, Submission},
    tui::{Event, EventResponse, Frame},
};

use super::Page;

const EXPIRED_MESSAGE: &str = "Session expired, please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    SignIn,
    Register,
}

impl Mode {
    fn form(self) -> FormPopup {
        match self {
            Mode::SignIn => FormPopup::new("Sign in", account::sign_in_schema()).open(None),
            Mode::Register => FormPopup::new("Create an account", account::register_schema())
                .open(account::register_defaults()),
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Mode::SignIn => " Ctrl+R: create an account",
            Mode::Register => " Esc: back to sign in",
        }
    }
}

/// Authentication boundary shown until a session exists. Offers sign-in and
/// account registration; both end with a stored session.
pub struct LoginPage {
    client: Arc<ApiClient>,
    action_tx: Option<UnboundedSender<Action>>,
    mode: Mode,
    form: FormPopup,
    banner: Banner,
}

impl LoginPage {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            action_tx: None,
            mode: Mode::SignIn,
            form: Mode::SignIn.form(),
            banner: Banner::default(),
        }
    }

    pub fn form(&self) -> &FormPopup {
        &self.form
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.message()
    }

    /// Switch between the two forms. Typed values are dropped.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.form.form().is_submitting() {
            return;
        }
        self.mode = mode;
        self.form = mode.form();
        self.banner.set(None);
    }

    fn submit(&mut self, submission: Submission) {
        let Some(tx) = self.action_tx.clone() else {
            return;
        };
        self.form.set_submitting(true);
        self.banner.set(None);

        let client = Arc::clone(&self.client);
        match self.mode {
            Mode::SignIn => {
                let request = account::login_request(&submission);
                tokio::spawn(async move {
                    let action = match client.login(&request).await {
                        Ok(session) => Action::LoggedIn(session),
                        Err(err) => {
                            warn!(email = %request.email, error = %err, "login failed");
                            Action::LoginFailed(err.to_string())
                        }
                    };
                    tx.send(action).ok();
                });
            }
            Mode::Register => {
                let request = account::register_request(&submission);
                tokio::spawn(async move {
                    let action = match client.register(&request).await {
                        Ok(session) => Action::LoggedIn(session),
                        Err(err) => {
                            warn!(email = %request.email, error = %err, "registration failed");
                            Action::LoginFailed(err.to_string())
                        }
                    };
                    tx.send(action).ok();
                });
            }
        }
    }

    /// Back to an empty sign-in form, keeping `message` in the banner.
    pub fn reset(&mut self, message: Option<String>) {
        self.mode = Mode::SignIn;
        self.form = Mode::SignIn.form();
        self.banner.set(message);
    }
}

impl Page for LoginPage {
    fn name(&self) -> &str {
        "login"
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.action_tx = Some(tx);
        Ok(())
    }

    fn keymap_context(&self) -> &'static str {
        self.form.keymap_context()
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn handle_events(&mut self, event: Event) -> Result<Option<EventResponse<Action>>> {
        if let Event::Key(key) = &event {
            if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
                let next = match self.mode {
                    Mode::SignIn => Mode::Register,
                    Mode::Register => Mode::SignIn,
                };
                self.set_mode(next);
                return Ok(Some(EventResponse::Stop(Action::Render)));
            }
        }
        self.form.handle_events(event)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FormSubmitted(submission) => self.submit(submission),
            Action::FormCancelled if self.mode == Mode::Register => self.set_mode(Mode::SignIn),
            Action::FormCancelled => return Ok(Some(Action::RequestQuit)),
            Action::LoggedIn(session) => {
                info!(user = ?session.display_name(), "session opened");
                self.reset(None);
            }
            Action::LoginFailed(message) => {
                self.form.set_submitting(false);
                self.banner.set(Some(message));
            }
            Action::SessionExpired => self.reset(Some(EXPIRED_MESSAGE.to_string())),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [banner_area, form_area, hint_area] = Layout::vertical([
            self.banner.height_constraint(),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);
        self.banner.draw(frame, banner_area)?;
        self.form.draw(frame, form_area)?;
        frame.render_widget(
            Paragraph::new(self.mode.hint()).style(Style::default().fg(Color::DarkGray)),
            hint_area,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use api::{ClientOptions, CredentialStore};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::form::FieldValue;

    fn page() -> LoginPage {
        let client = ApiClient::new(
            ClientOptions {
                base_url: "http://127.0.0.1:9".into(),
                ..Default::default()
            },
            CredentialStore::in_memory(),
        )
        .unwrap();
        LoginPage::new(Arc::new(client))
    }

    #[test]
    fn failure_shows_banner_and_unlocks_form() {
        let mut page = page();
        page.form.set_submitting(true);
        page.update(Action::LoginFailed("Invalid credentials".into())).unwrap();
        assert_eq!(page.banner(), Some("Invalid credentials"));
        assert!(!page.form().form().is_submitting());
    }

    #[test]
    fn expiry_resets_with_message() {
        let mut page = page();
        page.update(Action::SessionExpired).unwrap();
        assert_eq!(page.banner(), Some(EXPIRED_MESSAGE));
        assert_eq!(page.form().form().title(), "Sign in");
    }

    #[test]
    fn escape_asks_to_quit() {
        let mut page = page();
        assert_eq!(
            page.update(Action::FormCancelled).unwrap(),
            Some(Action::RequestQuit)
        );
    }

    #[test]
    fn ctrl_r_toggles_registration() {
        let mut page = page();
        let ctrl_r = crossterm::event::KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        page.handle_events(Event::Key(ctrl_r)).unwrap();
        assert_eq!(page.mode(), Mode::Register);
        assert_eq!(page.form().form().title(), "Create an account");
        assert_eq!(
            page.form().form().value("role"),
            Some(&FieldValue::text(account::DEFAULT_ROLE))
        );

        page.handle_events(Event::Key(ctrl_r)).unwrap();
        assert_eq!(page.mode(), Mode::SignIn);
    }

    #[test]
    fn escape_in_registration_goes_back_to_sign_in() {
        let mut page = page();
        page.set_mode(Mode::Register);
        assert_eq!(page.update(Action::FormCancelled).unwrap(), None);
        assert_eq!(page.mode(), Mode::SignIn);
        assert_eq!(page.form().form().title(), "Sign in");
    }

    #[test]
    fn mode_is_locked_while_submitting() {
        let mut page = page();
        page.form.set_submitting(true);
        page.set_mode(Mode::Register);
        assert_eq!(page.mode(), Mode::SignIn);
    }

    #[tokio::test]
    async fn failed_registration_keeps_the_form() {
        let mut page = page();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        page.register_action_handler(tx).unwrap();
        page.set_mode(Mode::Register);
        let submission = Submission {
            values: [
                ("nom", "Diallo"),
                ("prenom", "Awa"),
                ("email", "awa@chantier.test"),
                ("telephone", ""),
                ("role", "comptable"),
                ("password", "secret1"),
                ("confirmPassword", "secret1"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), FieldValue::text(v)))
            .collect(),
        };
        page.update(Action::FormSubmitted(submission)).unwrap();
        assert!(page.form().form().is_submitting());

        let action = rx.recv().await.unwrap();
        assert!(matches!(action, Action::LoginFailed(_)));
        page.update(action).unwrap();
        assert_eq!(page.mode(), Mode::Register);
        assert!(!page.form().form().is_submitting());
        assert!(page.banner().is_some());
    }

    #[tokio::test]
    async fn unreachable_backend_reports_failure() {
        let mut page = page();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        page.register_action_handler(tx).unwrap();
        let submission = Submission {
            values: [
                ("email".to_string(), FieldValue::text("chef@chantier.test")),
                ("password".to_string(), FieldValue::text("secret")),
            ]
            .into_iter()
            .collect(),
        };
        page.update(Action::FormSubmitted(submission)).unwrap();
        assert!(page.form().form().is_submitting());
        assert!(matches!(rx.recv().await, Some(Action::LoginFailed(_))));
    }
}
