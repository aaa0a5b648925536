// API client module: a small blocking HTTP client that talks to the admin
// backend. Each call performs exactly one request (no retry) and is meant to
// run on a worker thread; results travel back to the UI loop as messages.

use crate::cli::Config;
use crate::error::ClientError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

/// Backend endpoints. Everything except `Login` needs a bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Login,
    Command,
    Task,
    Backup,
    Backups,
    Restore,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Command => "command",
            Endpoint::Task => "task",
            Endpoint::Backup => "backup",
            Endpoint::Backups => "backups",
            Endpoint::Restore => "restore",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::Backups => Method::GET,
            _ => Method::POST,
        }
    }
}

/// Status and body of a completed round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Login request payload.
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Holds the reqwest blocking client and the backend base URL. Cloning is
/// cheap; each worker thread gets its own handle.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Config,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| ClientError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(ApiClient {
            client,
            config: config.clone(),
        })
    }

    fn auth_headers(token: &str) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| ClientError::SessionExpired)?;
        headers.insert(AUTHORIZATION, val);
        Ok(headers)
    }

    /// Perform one request. Authenticated calls (`token` present) that come
    /// back 401/403 turn into `SessionExpired`; any other status is returned
    /// as a `Reply` for the caller to interpret.
    pub fn issue(
        &self,
        endpoint: Endpoint,
        payload: Option<serde_json::Value>,
        token: Option<&str>,
        timeout: Duration,
    ) -> Result<Reply, ClientError> {
        let url = self.config.address(endpoint.path());
        debug!(method = %endpoint.method(), %url, "issuing request");

        let mut req = self
            .client
            .request(endpoint.method(), &url)
            .timeout(timeout)
            .header(CONTENT_TYPE, "application/json");
        if let Some(t) = token {
            req = req.headers(Self::auth_headers(t)?);
        }
        if let Some(body) = payload {
            req = req.json(&body);
        }

        let res = req.send().map_err(|e| {
            warn!(%url, error = %e, "request failed");
            ClientError::from(e)
        })?;
        let status = res.status();
        if token.is_some()
            && (status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN)
        {
            warn!(%url, %status, "session expired");
            return Err(ClientError::SessionExpired);
        }
        let body = res.text().map_err(ClientError::from)?;
        debug!(%url, %status, "request finished");
        Ok(Reply {
            status: status.as_u16(),
            body,
        })
    }

    /// Authenticate and return the bearer token.
    pub fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let payload = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .map_err(|e| ClientError::Decode(e.to_string()))?;
        let reply = self.issue(Endpoint::Login, Some(payload), None, self.config.timeouts.login)?;
        if !reply.is_success() {
            return Err(ClientError::BadCredentials);
        }
        let token = reply.body.trim();
        if token.is_empty() {
            return Err(ClientError::BadCredentials);
        }
        Ok(token.to_string())
    }

    /// Forward a console command verbatim.
    pub fn command(&self, token: &str, command: &str) -> Result<Reply, ClientError> {
        self.issue(
            Endpoint::Command,
            Some(json!({ "command": command })),
            Some(token),
            self.config.timeouts.command,
        )
    }

    /// Run a named backend task.
    pub fn task(&self, token: &str, task: &str) -> Result<Reply, ClientError> {
        self.issue(
            Endpoint::Task,
            Some(json!({ "task": task })),
            Some(token),
            self.config.timeouts.task,
        )
    }

    pub fn make_backup(&self, token: &str) -> Result<Reply, ClientError> {
        self.issue(Endpoint::Backup, None, Some(token), self.config.timeouts.task)
    }

    /// List backup file names as stored on the server.
    pub fn list_backups(&self, token: &str) -> Result<Vec<String>, ClientError> {
        let reply = self.issue(Endpoint::Backups, None, Some(token), self.config.timeouts.command)?;
        if !reply.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status: reply.status,
                body: reply.body,
            });
        }
        serde_json::from_str(&reply.body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub fn restore(&self, token: &str, filename: &str) -> Result<Reply, ClientError> {
        self.issue(
            Endpoint::Restore,
            Some(json!({ "filename": filename })),
            Some(token),
            self.config.timeouts.task,
        )
    }
}
