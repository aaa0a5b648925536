// In-process stand-in for the admin backend, served by axum on a
// background tokio runtime so the blocking client can talk to it.

#![allow(dead_code)]

use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mctui_cli::cli::Config;
use mctui_cli::router::Job;
use mctui_cli::screen::{App, Effect, Msg};
use serde_json::Value;
use std::collections::VecDeque;
use std::time::Duration;

pub const TOKEN: &str = "jwt-token";
pub const USER: &str = "admin";
pub const PASSWORD: &str = "adminpass123";
pub const BACKUPS: &[&str] = &["backup-2024-03-10-09-00-00.zip", "manual.zip"];

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "token expired").into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == USER && body["password"] == PASSWORD {
        (StatusCode::OK, format!("{TOKEN}\n")).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "bad credentials").into_response()
    }
}

async fn command(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match body["command"].as_str().unwrap_or_default() {
        "list" => (StatusCode::OK, "There are 0 of a max of 20 players online").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, "finally").into_response()
        }
        "" => (StatusCode::OK, "").into_response(),
        "crash" => (StatusCode::INTERNAL_SERVER_ERROR, "rcon unavailable").into_response(),
        other => (StatusCode::OK, format!("Unknown command: {other}")).into_response(),
    }
}

async fn task(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match body["task"].as_str().unwrap_or_default() {
        "sync" => (StatusCode::OK, "whitelist synced").into_response(),
        _ => (StatusCode::NOT_FOUND, "no such task").into_response(),
    }
}

async fn backup(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    StatusCode::OK.into_response()
}

async fn backups(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(BACKUPS).into_response()
}

async fn restore(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let name = body["filename"].as_str().unwrap_or_default();
    if BACKUPS.contains(&name) {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "no such backup").into_response()
    }
}

fn routes() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/command", post(command))
        .route("/task", post(task))
        .route("/backup", post(backup))
        .route("/backups", get(backups))
        .route("/restore", post(restore))
}

/// Start the backend and return a config pointing at it.
pub fn spawn_backend() -> Config {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("tokio runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind backend");
            tx.send(listener.local_addr().expect("local addr"))
                .expect("report address");
            axum::serve(listener, routes()).await.expect("serve backend");
        });
    });
    let addr = rx.recv().expect("backend address");
    Config::with_base_url(format!("http://{addr}"))
}

/// Apply `msg`, following posted messages, and collect the jobs to issue.
/// Panics if the app asked to quit.
pub fn drive(app: App, msg: Msg) -> (App, Vec<Job>) {
    let mut queue = VecDeque::from([msg]);
    let mut jobs = Vec::new();
    let mut app = app;
    while let Some(msg) = queue.pop_front() {
        let (next, effects) = app.update(msg);
        app = next;
        for effect in effects {
            match effect {
                Effect::Issue(job) => jobs.push(job),
                Effect::Post(msg) => queue.push_back(msg),
                Effect::Quit => panic!("unexpected quit"),
            }
        }
    }
    (app, jobs)
}

pub fn press(app: App, code: crossterm::event::KeyCode) -> (App, Vec<Job>) {
    use crossterm::event::{KeyEvent, KeyModifiers};
    drive(app, Msg::Key(KeyEvent::new(code, KeyModifiers::NONE)))
}

pub fn type_text(mut app: App, text: &str) -> App {
    for c in text.chars() {
        let (next, jobs) = press(app, crossterm::event::KeyCode::Char(c));
        assert!(jobs.is_empty());
        app = next;
    }
    app
}
