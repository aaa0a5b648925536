// Screen state machine.
//
// Exactly one `Screen` is active. Transient screens (the backup browser and
// the await overlay) own the console they hand control back to, so the
// navigation stack is at most two deep and cannot form a cycle.
//
// `App::update` consumes the current value and returns the next one together
// with the effects the runtime must perform. It never touches the network or
// the terminal itself.

use crate::await_overlay::{AwaitOverlay, Outcome};
use crate::backup::BackupItem;
use crate::browser::BackupBrowser;
use crate::cli::Config;
use crate::console::Console;
use crate::error::ClientError;
use crate::login::LoginScreen;
use crate::router::Job;
use crate::scrollback::Entry;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Bearer credential obtained at login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub issued_to: String,
}

impl Session {
    pub fn new(token: impl Into<String>, issued_to: impl Into<String>) -> Self {
        Session {
            token: token.into(),
            issued_to: issued_to.into(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("issued_to", &self.issued_to)
            .finish()
    }
}

/// Everything the loop can receive: terminal input and request completions.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize { width: u16, height: u16 },
    Tick,
    LoggedIn(Session),
    LoginFailed(ClientError),
    CommandOutput(Entry),
    TaskFinished(Outcome),
    BackupsLoaded(Vec<BackupItem>),
    BackupsFailed(String),
    SessionExpired,
    /// Result of an authenticated job, stamped with the token it was issued
    /// under. Dropped unless that session is still the active one.
    Completed { token: String, msg: Box<Msg> },
}

/// Work for the runtime after an update.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run the job on a worker and post its result back.
    Issue(Job),
    /// Feed a message back into the loop before reading new events.
    Post(Msg),
    Quit,
}

/// Values screens need from the configuration, plus the terminal size.
#[derive(Debug, Clone, Copy)]
pub struct Context {
    pub scrollback_limit: usize,
    pub task_timeout: Duration,
    pub width: u16,
    pub height: u16,
}

impl Context {
    pub fn from_config(config: &Config) -> Self {
        Context {
            scrollback_limit: config.scrollback_limit,
            task_timeout: config.timeouts.task,
            width: 80,
            height: 24,
        }
    }
}

/// Overlay plus the console it returns to.
#[derive(Debug, Clone)]
pub struct AwaitScreen {
    pub overlay: AwaitOverlay,
    pub return_to: Box<Console>,
}

#[derive(Debug, Clone)]
pub enum Screen {
    Login(LoginScreen),
    Console(Console),
    BackupBrowser(BackupBrowser),
    Await(AwaitScreen),
}

pub type Transition = (Screen, Vec<Effect>);

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Login(_) => "login",
            Screen::Console(_) => "console",
            Screen::BackupBrowser(_) => "backup-browser",
            Screen::Await(_) => "await",
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Screen::Login(_) => None,
            Screen::Console(c) => Some(c.session()),
            Screen::BackupBrowser(b) => Some(b.return_to.session()),
            Screen::Await(a) => Some(a.return_to.session()),
        }
    }

    /// Apply the terminal size to this screen and whatever it returns to.
    pub fn resize(&mut self, width: u16, height: u16) {
        match self {
            Screen::Login(_) => {}
            Screen::Console(c) => c.resize(width, height),
            Screen::BackupBrowser(b) => b.return_to.resize(width, height),
            Screen::Await(a) => a.return_to.resize(width, height),
        }
    }
}

impl AwaitScreen {
    pub fn new(overlay: AwaitOverlay, return_to: Console) -> Self {
        AwaitScreen {
            overlay,
            return_to: Box::new(return_to),
        }
    }

    pub fn update(mut self, msg: Msg) -> Transition {
        match msg {
            Msg::Tick => self.overlay.tick(),
            Msg::TaskFinished(outcome) => {
                debug!(title = %outcome.title, success = outcome.success, "task finished");
                self.overlay.complete(outcome);
            }
            Msg::CommandOutput(entry) => self.return_to.absorb(entry),
            Msg::Key(_) if self.overlay.is_terminal() => {
                let console = *self.return_to;
                let effects = self
                    .overlay
                    .take_outcome()
                    .map(|o| vec![Effect::Post(Msg::TaskFinished(o))])
                    .unwrap_or_default();
                return (Screen::Console(console), effects);
            }
            _ => {}
        }
        (Screen::Await(self), Vec::new())
    }
}

pub fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// The whole client state.
#[derive(Debug, Clone)]
pub struct App {
    screen: Screen,
    ctx: Context,
}

impl App {
    pub fn new(config: &Config) -> Self {
        App {
            screen: Screen::Login(LoginScreen::new()),
            ctx: Context::from_config(config),
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn update(self, msg: Msg) -> (App, Vec<Effect>) {
        let App { screen, mut ctx } = self;
        let from = screen.name();

        let (screen, effects) = match msg {
            Msg::Key(key) if is_quit(&key) => (screen, vec![Effect::Quit]),
            Msg::Resize { width, height } => {
                ctx.width = width;
                ctx.height = height;
                let mut screen = screen;
                screen.resize(width, height);
                (screen, Vec::new())
            }
            Msg::Completed { token, msg } => {
                if screen.session().map(|s| s.token.as_str()) == Some(token.as_str()) {
                    return App { screen, ctx }.update(*msg);
                }
                debug!(screen = from, "dropping result issued under another session");
                (screen, Vec::new())
            }
            Msg::SessionExpired if screen.session().is_some() => {
                warn!(screen = from, "session expired, back to login");
                (Screen::Login(LoginScreen::expired()), Vec::new())
            }
            msg => match screen {
                Screen::Login(login) => login.update(msg, &ctx),
                Screen::Console(console) => console.update(msg, &ctx),
                Screen::BackupBrowser(browser) => browser.update(msg, &ctx),
                Screen::Await(waiting) => waiting.update(msg),
            },
        };

        if screen.name() != from {
            debug!(from, to = screen.name(), "screen transition");
        }
        (App { screen, ctx }, effects)
    }
}
