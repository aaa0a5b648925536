// Login screen: username and password fields. Submitting issues a login
// job; a successful reply opens the console with the new session.

use crate::console::Console;
use crate::router::Job;
use crate::screen::{Context, Effect, Msg, Screen, Transition};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

pub const FIELD_CHAR_LIMIT: usize = 16;
pub const EXPIRED_NOTICE: &str = "Session expired, please log in again";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Field {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginScreen {
    pub username: String,
    pub password: String,
    pub focus: Field,
    /// Set after a failed attempt; any key dismisses it.
    pub error: Option<String>,
    pub notice: Option<String>,
    /// A login request is in flight.
    pub pending: bool,
}

impl LoginScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh form shown after the backend rejected the session.
    pub fn expired() -> Self {
        LoginScreen {
            notice: Some(EXPIRED_NOTICE.to_string()),
            ..Self::new()
        }
    }

    pub fn focused(&self) -> Field {
        self.focus
    }

    fn clear_form(&mut self) {
        self.username.clear();
        self.password.clear();
        self.focus = Field::Username;
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focused() {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Username => Field::Password,
            Field::Password => Field::Username,
        };
    }

    pub fn update(mut self, msg: Msg, ctx: &Context) -> Transition {
        match msg {
            Msg::Key(key) => return self.on_key(key),
            Msg::LoggedIn(session) if self.pending => {
                let console = Console::new(session, ctx);
                return (Screen::Console(console), Vec::new());
            }
            Msg::LoginFailed(err) if self.pending => {
                self.pending = false;
                self.error = Some(format!("Can't login: {err}"));
                self.clear_form();
            }
            _ => {}
        }
        (Screen::Login(self), Vec::new())
    }

    fn on_key(mut self, key: KeyEvent) -> Transition {
        if self.error.is_some() {
            self.error = None;
            self.clear_form();
            return (Screen::Login(self), Vec::new());
        }
        let mut effects = Vec::new();
        match key.code {
            KeyCode::Enter if !self.pending => {
                if let Some(job) = self.submit() {
                    debug!(user = %self.username, "submitting login");
                    self.pending = true;
                    self.notice = None;
                    effects.push(Effect::Issue(job));
                }
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => self.toggle_focus(),
            KeyCode::Backspace => {
                self.field_mut().pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let field = self.field_mut();
                if field.chars().count() < FIELD_CHAR_LIMIT {
                    field.push(c);
                }
            }
            _ => {}
        }
        (Screen::Login(self), effects)
    }

    /// Enter: move to the password field first, then log in once both are set.
    fn submit(&mut self) -> Option<Job> {
        if self.username.is_empty() {
            return None;
        }
        if self.password.is_empty() {
            if self.focus == Field::Username {
                self.focus = Field::Password;
            }
            return None;
        }
        Some(Job::Login {
            username: self.username.clone(),
            password: self.password.clone(),
        })
    }
}
