// Backup browser: lists backups fetched from the server and restores the
// selected one. Backing out returns to the console with a canceled outcome.

use crate::await_overlay::{AwaitOverlay, Outcome};
use crate::backup::BackupItem;
use crate::console::Console;
use crate::router::{Job, RESTORE_TITLE};
use crate::screen::{AwaitScreen, Context, Effect, Msg, Screen, Transition};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info};

pub const CANCELED_MESSAGE: &str = "Operation canceled by user";

#[derive(Debug, Clone)]
pub struct BackupBrowser {
    pub items: Vec<BackupItem>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub return_to: Box<Console>,
}

impl BackupBrowser {
    /// Open over `console` and return the listing job to issue.
    pub fn open(console: Console) -> (Self, Job) {
        let job = Job::ListBackups {
            token: console.session().token.clone(),
        };
        let browser = BackupBrowser {
            items: Vec::new(),
            selected: 0,
            loading: true,
            error: None,
            return_to: Box::new(console),
        };
        (browser, job)
    }

    pub fn selected_item(&self) -> Option<&BackupItem> {
        self.items.get(self.selected)
    }

    pub fn update(mut self, msg: Msg, ctx: &Context) -> Transition {
        match msg {
            Msg::Key(key) => return self.on_key(key, ctx),
            Msg::BackupsLoaded(items) => {
                debug!(count = items.len(), "backups loaded");
                self.items = items;
                self.selected = self.selected.min(self.items.len().saturating_sub(1));
                self.loading = false;
                self.error = None;
            }
            Msg::BackupsFailed(err) => {
                self.loading = false;
                self.error = Some(err);
            }
            Msg::CommandOutput(entry) => self.return_to.absorb(entry),
            _ => {}
        }
        (Screen::BackupBrowser(self), Vec::new())
    }

    fn on_key(mut self, key: KeyEvent, ctx: &Context) -> Transition {
        match key.code {
            KeyCode::Esc => {
                debug!("restore canceled");
                let outcome = Outcome::failed(RESTORE_TITLE, CANCELED_MESSAGE);
                return (
                    Screen::Console(*self.return_to),
                    vec![Effect::Post(Msg::TaskFinished(outcome))],
                );
            }
            KeyCode::Enter => {
                if let Some(item) = self.selected_item() {
                    info!(backup = %item.raw_id, "restoring backup");
                    let job = Job::Restore {
                        token: self.return_to.session().token.clone(),
                        filename: item.raw_id.clone(),
                    };
                    let overlay = AwaitOverlay::new("Restoring backup", ctx.task_timeout);
                    let waiting = AwaitScreen {
                        overlay,
                        return_to: self.return_to,
                    };
                    return (Screen::Await(waiting), vec![Effect::Issue(job)]);
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.items.len().saturating_sub(1),
            KeyCode::Char('r') if !self.loading => {
                self.loading = true;
                self.error = None;
                let job = Job::ListBackups {
                    token: self.return_to.session().token.clone(),
                };
                return (Screen::BackupBrowser(self), vec![Effect::Issue(job)]);
            }
            _ => {}
        }
        (Screen::BackupBrowser(self), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::Session;
    use crate::scrollback::Entry;
    use crossterm::event::KeyModifiers;
    use std::time::Duration;

    fn ctx() -> Context {
        Context {
            scrollback_limit: 100,
            task_timeout: Duration::from_secs(60),
            width: 80,
            height: 24,
        }
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn item(name: &str) -> BackupItem {
        BackupItem {
            display_name: format!("{name} (display)"),
            raw_id: name.to_string(),
        }
    }

    fn loaded() -> BackupBrowser {
        let console = Console::new(Session::new("jwt", "admin"), &ctx());
        let (browser, _) = BackupBrowser::open(console);
        match browser.update(Msg::BackupsLoaded(vec![item("a.zip"), item("b.zip")]), &ctx()).0 {
            Screen::BackupBrowser(b) => b,
            other => panic!("expected browser, got {}", other.name()),
        }
    }

    #[test]
    fn listing_replaces_items() {
        let browser = loaded();
        assert!(!browser.loading);
        assert_eq!(browser.items.len(), 2);
        let browser = match browser.update(Msg::BackupsLoaded(vec![item("c.zip")]), &ctx()).0 {
            Screen::BackupBrowser(b) => b,
            other => panic!("expected browser, got {}", other.name()),
        };
        assert_eq!(browser.items, vec![item("c.zip")]);
    }

    #[test]
    fn enter_restores_and_skips_back_to_console() {
        let browser = loaded();
        let browser = match browser.update(key(KeyCode::Down), &ctx()).0 {
            Screen::BackupBrowser(b) => b,
            other => panic!("expected browser, got {}", other.name()),
        };
        let (screen, effects) = browser.update(key(KeyCode::Enter), &ctx());
        match screen {
            Screen::Await(a) => {
                assert_eq!(a.overlay.label(), "Restoring backup");
                assert_eq!(a.return_to.session().token, "jwt");
            }
            other => panic!("expected await, got {}", other.name()),
        }
        assert_eq!(
            effects,
            vec![Effect::Issue(Job::Restore { token: "jwt".into(), filename: "b.zip".into() })]
        );
    }

    #[test]
    fn enter_on_empty_list_does_nothing() {
        let console = Console::new(Session::new("jwt", "admin"), &ctx());
        let (browser, _) = BackupBrowser::open(console);
        let (screen, effects) = browser.update(key(KeyCode::Enter), &ctx());
        assert_eq!(screen.name(), "backup-browser");
        assert!(effects.is_empty());
    }

    #[test]
    fn escape_returns_with_canceled_outcome() {
        let (screen, effects) = loaded().update(key(KeyCode::Esc), &ctx());
        assert_eq!(screen.name(), "console");
        assert_eq!(
            effects,
            vec![Effect::Post(Msg::TaskFinished(Outcome::failed(
                RESTORE_TITLE,
                CANCELED_MESSAGE
            )))]
        );
    }

    #[test]
    fn refresh_refetches() {
        let (screen, effects) = loaded().update(key(KeyCode::Char('r')), &ctx());
        match screen {
            Screen::BackupBrowser(b) => assert!(b.loading),
            other => panic!("expected browser, got {}", other.name()),
        }
        assert_eq!(effects, vec![Effect::Issue(Job::ListBackups { token: "jwt".into() })]);
    }

    #[test]
    fn late_command_output_reaches_the_console() {
        let browser = loaded();
        let (screen, _) = browser.update(Msg::CommandOutput(Entry::new("list", "ok")), &ctx());
        match screen {
            Screen::BackupBrowser(b) => assert_eq!(b.return_to.scrollback().len(), 1),
            other => panic!("expected browser, got {}", other.name()),
        }
    }

    #[test]
    fn listing_failure_is_shown() {
        let (screen, _) = loaded().update(Msg::BackupsFailed("unexpected status 500".into()), &ctx());
        match screen {
            Screen::BackupBrowser(b) => {
                assert_eq!(b.error.as_deref(), Some("unexpected status 500"));
                assert!(!b.loading);
            }
            other => panic!("expected browser, got {}", other.name()),
        }
    }
}
