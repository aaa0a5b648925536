// Request issuer and dispatcher against the in-process backend.

mod support;

use mctui_cli::api::{ApiClient, Endpoint};
use mctui_cli::error::ClientError;
use mctui_cli::router::{Dispatcher, Job, RESTORE_TITLE};
use mctui_cli::screen::Msg;
use std::time::Duration;
use support::{spawn_backend, BACKUPS, PASSWORD, TOKEN, USER};

fn dispatcher() -> Dispatcher {
    let config = spawn_backend();
    Dispatcher::new(ApiClient::new(&config).unwrap(), chrono::Duration::zero())
}

/// Unwrap an authenticated result, checking it carries the issuing token.
fn settled(msg: Msg, token: &str) -> Msg {
    match msg {
        Msg::Completed { token: stamped, msg } => {
            assert_eq!(stamped, token);
            *msg
        }
        other => panic!("expected a stamped result, got {other:?}"),
    }
}

#[test]
fn login_returns_trimmed_token() {
    let api = ApiClient::new(&spawn_backend()).unwrap();
    assert_eq!(api.login(USER, PASSWORD).unwrap(), TOKEN);
}

#[test]
fn login_rejection_is_bad_credentials_not_expiry() {
    let api = ApiClient::new(&spawn_backend()).unwrap();
    assert_eq!(api.login(USER, "nope"), Err(ClientError::BadCredentials));
}

#[test]
fn command_reply_carries_status_and_body() {
    let api = ApiClient::new(&spawn_backend()).unwrap();
    let reply = api.command(TOKEN, "list").unwrap();
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("players online"));
}

#[test]
fn server_errors_are_replies() {
    let api = ApiClient::new(&spawn_backend()).unwrap();
    let reply = api.command(TOKEN, "crash").unwrap();
    assert_eq!(reply.status, 500);
    assert!(!reply.is_success());
}

#[test]
fn unauthorized_means_session_expired() {
    let api = ApiClient::new(&spawn_backend()).unwrap();
    assert_eq!(api.command("stale", "list"), Err(ClientError::SessionExpired));
    assert_eq!(api.list_backups("stale"), Err(ClientError::SessionExpired));
}

#[test]
fn slow_replies_time_out() {
    let mut config = spawn_backend();
    config.timeouts.command = Duration::from_millis(300);
    let api = ApiClient::new(&config).unwrap();
    assert_eq!(api.command(TOKEN, "slow"), Err(ClientError::Timeout));
}

#[test]
fn issue_uses_the_caller_timeout() {
    let api = ApiClient::new(&spawn_backend()).unwrap();
    let reply = api
        .issue(
            Endpoint::Command,
            Some(serde_json::json!({ "command": "list" })),
            Some(TOKEN),
            Duration::from_secs(5),
        )
        .unwrap();
    assert!(reply.is_success());
}

#[test]
fn dispatcher_logs_in() {
    let msg = dispatcher().run(Job::Login {
        username: USER.into(),
        password: PASSWORD.into(),
    });
    match msg {
        Msg::LoggedIn(session) => {
            assert_eq!(session.token, TOKEN);
            assert_eq!(session.issued_to, USER);
        }
        other => panic!("expected login, got {other:?}"),
    }
}

#[test]
fn dispatcher_reports_login_failure() {
    let msg = dispatcher().run(Job::Login {
        username: USER.into(),
        password: "wrong".into(),
    });
    assert_eq!(msg, Msg::LoginFailed(ClientError::BadCredentials));
}

#[test]
fn dispatcher_labels_empty_commands() {
    let msg = settled(
        dispatcher().run(Job::Command { token: TOKEN.into(), text: String::new() }),
        TOKEN,
    );
    match msg {
        Msg::CommandOutput(entry) => assert_eq!(entry.label, "(empty)"),
        other => panic!("expected output, got {other:?}"),
    }
}

#[test]
fn dispatcher_turns_server_errors_into_scrollback_text() {
    let msg = settled(
        dispatcher().run(Job::Command { token: TOKEN.into(), text: "crash".into() }),
        TOKEN,
    );
    match msg {
        Msg::CommandOutput(entry) => assert_eq!(entry.body, "error 500: rcon unavailable"),
        other => panic!("expected output, got {other:?}"),
    }
}

#[test]
fn dispatcher_runs_backup_task() {
    let job = Job::Task {
        token: TOKEN.into(),
        name: "backup".into(),
        title: "!backup".into(),
    };
    let msg = settled(dispatcher().run(job), TOKEN);
    match msg {
        Msg::TaskFinished(outcome) => {
            assert!(outcome.success);
            assert_eq!(outcome.title, "!backup");
            assert_eq!(outcome.message, "200 Backup complete");
        }
        other => panic!("expected outcome, got {other:?}"),
    }
}

#[test]
fn dispatcher_runs_named_tasks_and_rejects_unknown_ones() {
    let d = dispatcher();
    let sync = Job::Task { token: TOKEN.into(), name: "sync".into(), title: "!sync".into() };
    match settled(d.run(sync), TOKEN) {
        Msg::TaskFinished(outcome) => {
            assert!(outcome.success);
            assert_eq!(outcome.message, "whitelist synced");
        }
        other => panic!("expected outcome, got {other:?}"),
    }
    let nope = Job::Task { token: TOKEN.into(), name: "nope".into(), title: "!nope".into() };
    match settled(d.run(nope), TOKEN) {
        Msg::TaskFinished(outcome) => {
            assert!(!outcome.success);
            assert_eq!(outcome.message, "task !nope not valid");
        }
        other => panic!("expected outcome, got {other:?}"),
    }
}

#[test]
fn dispatcher_lists_backups_in_server_order() {
    match settled(dispatcher().run(Job::ListBackups { token: TOKEN.into() }), TOKEN) {
        Msg::BackupsLoaded(items) => {
            let ids: Vec<_> = items.iter().map(|i| i.raw_id.as_str()).collect();
            assert_eq!(ids, BACKUPS);
            assert!(items[0].display_name.ends_with("ago"));
            assert_eq!(items[1].display_name, "manual.zip");
        }
        other => panic!("expected listing, got {other:?}"),
    }
}

#[test]
fn dispatcher_restores() {
    let d = dispatcher();
    let ok = settled(
        d.run(Job::Restore { token: TOKEN.into(), filename: BACKUPS[0].into() }),
        TOKEN,
    );
    match ok {
        Msg::TaskFinished(outcome) => {
            assert!(outcome.success);
            assert_eq!(outcome.title, RESTORE_TITLE);
        }
        other => panic!("expected outcome, got {other:?}"),
    }
    let missing = settled(
        d.run(Job::Restore { token: TOKEN.into(), filename: "gone.zip".into() }),
        TOKEN,
    );
    match missing {
        Msg::TaskFinished(outcome) => {
            assert!(!outcome.success);
            assert_eq!(outcome.message, "no such backup");
        }
        other => panic!("expected outcome, got {other:?}"),
    }
}

#[test]
fn dispatcher_signals_expiry_for_authenticated_jobs() {
    let d = dispatcher();
    for job in [
        Job::Command { token: "stale".into(), text: "list".into() },
        Job::Task { token: "stale".into(), name: "backup".into(), title: "!backup".into() },
        Job::ListBackups { token: "stale".into() },
        Job::Restore { token: "stale".into(), filename: BACKUPS[0].into() },
    ] {
        assert_eq!(settled(d.run(job), "stale"), Msg::SessionExpired);
    }
}
