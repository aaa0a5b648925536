// Console screen: scrollback on top, command prompt below. Plain commands
// stay on this screen and append their output when it arrives; tasks and
// shortcuts hand control to the overlay or the backup browser.

use crate::await_overlay::AwaitOverlay;
use crate::browser::BackupBrowser;
use crate::router::{self, Job, Route, Target};
use crate::screen::{AwaitScreen, Context, Effect, Msg, Screen, Session, Transition};
use crate::scrollback::{Entry, Scrollback};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEventKind};
use std::time::Instant;
use tracing::{debug, info};

pub const INPUT_CHAR_LIMIT: usize = 128;
/// Rows taken by the prompt box under the scrollback.
pub const PROMPT_HEIGHT: u16 = 3;
pub const SCROLL_STEP: usize = 3;

/// Inner (width, height) of the scrollback box for a terminal size:
/// rounded border on every side plus one column of padding left and right.
pub fn console_viewport(width: u16, height: u16) -> (usize, usize) {
    let inner_width = width.saturating_sub(4);
    let inner_height = height.saturating_sub(PROMPT_HEIGHT).saturating_sub(2);
    (inner_width as usize, inner_height as usize)
}

/// A plain command waiting for its reply.
#[derive(Debug, Clone)]
pub struct PendingCommand {
    pub text: String,
    pub started_at: Instant,
}

#[derive(Debug, Clone)]
pub struct Console {
    scrollback: Scrollback,
    input: String,
    session: Session,
    pending: Option<PendingCommand>,
}

impl Console {
    pub fn new(session: Session, ctx: &Context) -> Self {
        let mut scrollback = Scrollback::new(ctx.scrollback_limit);
        let (w, h) = console_viewport(ctx.width, ctx.height);
        scrollback.resize(w, h);
        info!(user = %session.issued_to, "console opened");
        Console {
            scrollback,
            input: String::new(),
            session,
            pending: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn scrollback(&self) -> &Scrollback {
        &self.scrollback
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn pending(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let (w, h) = console_viewport(width, height);
        self.scrollback.resize(w, h);
    }

    /// Take a command reply, whichever screen is on top.
    pub fn absorb(&mut self, entry: Entry) {
        self.pending = None;
        self.scrollback.append(entry);
    }

    pub fn update(mut self, msg: Msg, ctx: &Context) -> Transition {
        match msg {
            Msg::Key(key) => return self.on_key(key, ctx),
            Msg::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => self.scrollback.scroll_up(SCROLL_STEP),
                MouseEventKind::ScrollDown => self.scrollback.scroll_down(SCROLL_STEP),
                _ => {}
            },
            Msg::CommandOutput(entry) => self.absorb(entry),
            Msg::TaskFinished(outcome) => {
                debug!(title = %outcome.title, "appending task outcome");
                self.scrollback.append(Entry::new(outcome.title, outcome.message));
            }
            _ => {}
        }
        (Screen::Console(self), Vec::new())
    }

    fn on_key(mut self, key: KeyEvent, ctx: &Context) -> Transition {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let page = self.scrollback.viewport().1.max(1);
        match key.code {
            KeyCode::Enter => return self.submit(ctx),
            KeyCode::F(1) if self.pending.is_none() => return self.open_browser(),
            KeyCode::Up => {
                if let Some(cmd) = self.scrollback.history_prev() {
                    self.input = cmd.to_string();
                }
            }
            KeyCode::Down => {
                self.input = self.scrollback.history_next().unwrap_or_default().to_string();
            }
            KeyCode::Char('k') if ctrl => self.scrollback.scroll_up(SCROLL_STEP),
            KeyCode::Char('j') if ctrl => self.scrollback.scroll_down(SCROLL_STEP),
            KeyCode::PageUp => self.scrollback.scroll_up(page),
            KeyCode::PageDown => self.scrollback.scroll_down(page),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) if !ctrl => {
                if self.input.chars().count() < INPUT_CHAR_LIMIT {
                    self.input.push(c);
                }
            }
            _ => {}
        }
        (Screen::Console(self), Vec::new())
    }

    fn submit(mut self, ctx: &Context) -> Transition {
        if self.pending.is_some() {
            debug!("command still pending, input ignored");
            return (Screen::Console(self), Vec::new());
        }
        let line = std::mem::take(&mut self.input);
        debug!(input = %line, "user input");
        self.scrollback.record_command(&line);

        match router::classify(&line) {
            Route::Navigation(Target::BackupBrowser) => self.open_browser(),
            Route::Task(name) => {
                let job = Job::Task {
                    token: self.session.token.clone(),
                    name: name.clone(),
                    title: line,
                };
                let overlay = AwaitOverlay::new(router::task_label(&name), ctx.task_timeout);
                (
                    Screen::Await(AwaitScreen::new(overlay, self)),
                    vec![Effect::Issue(job)],
                )
            }
            Route::PlainCommand(text) => {
                if let Err(rejected) = router::permit(&text) {
                    debug!(error = %rejected, "command rejected locally");
                    self.scrollback
                        .append(Entry::new(router::entry_label(&text), rejected.to_string()));
                    return (Screen::Console(self), Vec::new());
                }
                let job = Job::Command {
                    token: self.session.token.clone(),
                    text: text.clone(),
                };
                self.pending = Some(PendingCommand {
                    text,
                    started_at: Instant::now(),
                });
                (Screen::Console(self), vec![Effect::Issue(job)])
            }
        }
    }

    fn open_browser(self) -> Transition {
        let (browser, job) = BackupBrowser::open(self);
        (Screen::BackupBrowser(browser), vec![Effect::Issue(job)])
    }
}
