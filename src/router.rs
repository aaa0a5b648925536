// Command routing: turns a console line into a navigation shortcut, a
// backend task or a plain command, and runs the request a job stands for.
// Jobs are plain values; `Dispatcher::run` is what a worker thread calls and
// its return value is posted back to the UI loop.

use crate::api::{ApiClient, Reply};
use crate::await_overlay::Outcome;
use crate::backup;
use crate::error::ClientError;
use crate::screen::{Msg, Session};
use crate::scrollback::{Entry, EMPTY_INPUT_LABEL};
use tracing::{debug, info, warn};

/// Prefix marking tasks and shortcuts.
pub const ESCAPE: char = '!';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    BackupBrowser,
}

/// Aliases that open a screen instead of running a task.
pub const NAVIGATION_ALIASES: &[(&str, Target)] = &[("restore", Target::BackupBrowser)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Navigation(Target),
    Task(String),
    PlainCommand(String),
}

pub fn classify(input: &str) -> Route {
    let trimmed = input.trim();
    match trimmed.strip_prefix(ESCAPE) {
        Some(name) => {
            let name = name.trim();
            NAVIGATION_ALIASES
                .iter()
                .find(|(alias, _)| *alias == name)
                .map(|&(_, target)| Route::Navigation(target))
                .unwrap_or_else(|| Route::Task(name.to_string()))
        }
        None => Route::PlainCommand(input.to_string()),
    }
}

/// Plain commands containing the word `stop` never leave the client.
pub fn permit(command: &str) -> Result<(), ClientError> {
    if command.split_whitespace().any(|token| token == "stop") {
        return Err(ClientError::UserRejected(command.to_string()));
    }
    Ok(())
}

/// Scrollback label for a submitted line.
pub fn entry_label(input: &str) -> String {
    if input.trim().is_empty() {
        EMPTY_INPUT_LABEL.to_string()
    } else {
        input.to_string()
    }
}

/// Overlay text while a task runs.
pub fn task_label(name: &str) -> String {
    match name {
        "backup" => "Making backup".to_string(),
        _ => format!("Running {name}"),
    }
}

/// One outbound call, with everything needed to perform it off the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Login { username: String, password: String },
    Command { token: String, text: String },
    /// `title` is the line the user typed; it labels the outcome.
    Task { token: String, name: String, title: String },
    ListBackups { token: String },
    Restore { token: String, filename: String },
}

impl Job {
    pub fn kind(&self) -> &'static str {
        match self {
            Job::Login { .. } => "login",
            Job::Command { .. } => "command",
            Job::Task { .. } => "task",
            Job::ListBackups { .. } => "list-backups",
            Job::Restore { .. } => "restore",
        }
    }

    /// Token the job is issued under; `None` for login.
    pub fn token(&self) -> Option<&str> {
        match self {
            Job::Login { .. } => None,
            Job::Command { token, .. }
            | Job::Task { token, .. }
            | Job::ListBackups { token }
            | Job::Restore { token, .. } => Some(token),
        }
    }
}

pub const RESTORE_TITLE: &str = "Restore backup";

/// Performs jobs against the backend and maps results to loop messages.
#[derive(Clone)]
pub struct Dispatcher {
    api: ApiClient,
    time_offset: chrono::Duration,
}

impl Dispatcher {
    pub fn new(api: ApiClient, time_offset: chrono::Duration) -> Self {
        Dispatcher { api, time_offset }
    }

    /// Perform `job`. Results of authenticated jobs come back wrapped in
    /// `Msg::Completed` with the token they were issued under.
    pub fn run(&self, job: Job) -> Msg {
        debug!(kind = job.kind(), "running job");
        match job.token().map(str::to_owned) {
            Some(token) => Msg::Completed {
                token,
                msg: Box::new(self.perform(job)),
            },
            None => self.perform(job),
        }
    }

    fn perform(&self, job: Job) -> Msg {
        match job {
            Job::Login { username, password } => match self.api.login(&username, &password) {
                Ok(token) => {
                    info!(user = %username, "logged in");
                    Msg::LoggedIn(Session::new(token, username))
                }
                Err(e) => {
                    warn!(error = %e, "login failed");
                    Msg::LoginFailed(e)
                }
            },
            Job::Command { token, text } => {
                let label = entry_label(&text);
                match self.api.command(&token, &text) {
                    Ok(reply) => Msg::CommandOutput(Entry::new(label, command_body(&reply))),
                    Err(ClientError::SessionExpired) => Msg::SessionExpired,
                    Err(e) => Msg::CommandOutput(Entry::new(label, e.to_string())),
                }
            }
            Job::Task { token, name, title } => {
                let result = if name == "backup" {
                    self.api.make_backup(&token)
                } else {
                    self.api.task(&token, &name)
                };
                match result {
                    Err(ClientError::SessionExpired) => Msg::SessionExpired,
                    other => Msg::TaskFinished(task_outcome(&name, title, other)),
                }
            }
            Job::ListBackups { token } => match self.api.list_backups(&token) {
                Ok(names) => Msg::BackupsLoaded(backup::items_from_names(
                    &names,
                    self.time_offset,
                    chrono::Utc::now(),
                )),
                Err(ClientError::SessionExpired) => Msg::SessionExpired,
                Err(e) => Msg::BackupsFailed(e.to_string()),
            },
            Job::Restore { token, filename } => match self.api.restore(&token, &filename) {
                Err(ClientError::SessionExpired) => Msg::SessionExpired,
                Ok(reply) if reply.is_success() => Msg::TaskFinished(Outcome::succeeded(
                    RESTORE_TITLE,
                    format!("{} Backup restored", reply.status),
                )),
                Ok(reply) => Msg::TaskFinished(Outcome::failed(RESTORE_TITLE, failure_body(&reply))),
                Err(e) => Msg::TaskFinished(Outcome::failed(RESTORE_TITLE, e.to_string())),
            },
        }
    }
}

fn command_body(reply: &Reply) -> String {
    if reply.is_success() {
        reply.body.clone()
    } else {
        format!("error {}: {}", reply.status, reply.body.trim())
    }
}

fn failure_body(reply: &Reply) -> String {
    let body = reply.body.trim();
    if body.is_empty() {
        format!("server answered {}", reply.status)
    } else {
        body.to_string()
    }
}

fn task_outcome(name: &str, title: String, result: Result<Reply, ClientError>) -> Outcome {
    match result {
        Ok(reply) if reply.is_success() => {
            let message = if name == "backup" {
                format!("{} Backup complete", reply.status)
            } else {
                reply.body
            };
            info!(task = name, "task finished");
            Outcome::succeeded(title, message)
        }
        Ok(reply) if reply.status == 404 => {
            Outcome::failed(title, ClientError::UnknownTask(format!("{ESCAPE}{name}")).to_string())
        }
        Ok(reply) => Outcome::failed(title, failure_body(&reply)),
        Err(e) => Outcome::failed(title, e.to_string()),
    }
}
