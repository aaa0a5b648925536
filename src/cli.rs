// Command-line surface and the validated configuration derived from it.
// `Config` is built once in `main` and passed explicitly to the request
// issuer and the screens; nothing here is global.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const PORT_MIN: u32 = 1;
pub const PORT_MAX: u32 = 65535;

/// Raw arguments as typed by the user.
#[derive(Debug, Parser)]
#[command(name = "mctui", about = "Terminal console for a remote game server admin API")]
pub struct Args {
    /// Backend host name or address
    #[arg(short = 'a', long)]
    pub host: String,

    /// Backend port
    #[arg(short = 'p', long)]
    pub port: u32,

    /// Time offset in minutes applied to backup timestamps before display
    #[arg(short = 't', long = "time-offset", default_value_t = 0, allow_negative_numbers = true)]
    pub time_offset_min: i64,

    /// Reject invalid or self-signed TLS certificates
    #[arg(long)]
    pub verify_tls: bool,

    /// Write debug logs here instead of the cache directory (needs DEBUG=1)
    #[arg(long, env = "MCTUI_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("you must specify a port")]
    MissingPort,
    #[error("port out of range: {0} (expected 1-65535)")]
    PortOutOfRange(u32),
    #[error("host must not be empty")]
    EmptyHost,
}

/// Request deadlines, one per kind of call.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub login: Duration,
    pub command: Duration,
    pub task: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            login: Duration::from_secs(5),
            command: Duration::from_secs(10),
            task: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub time_offset: chrono::Duration,
    pub verify_tls: bool,
    pub timeouts: Timeouts,
    pub scrollback_limit: usize,
    pub log_file: Option<PathBuf>,
}

pub const DEFAULT_SCROLLBACK_LIMIT: usize = 1000;

impl Args {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::MissingPort);
        }
        if !(PORT_MIN..=PORT_MAX).contains(&self.port) {
            return Err(ConfigError::PortOutOfRange(self.port));
        }
        Ok(())
    }

    /// Validate and turn the arguments into a `Config`.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        self.validate()?;
        Ok(Config {
            base_url: format!("https://{}:{}", self.host.trim(), self.port),
            time_offset: chrono::Duration::minutes(self.time_offset_min),
            verify_tls: self.verify_tls,
            timeouts: Timeouts::default(),
            scrollback_limit: DEFAULT_SCROLLBACK_LIMIT,
            log_file: self.log_file,
        })
    }
}

impl Config {
    /// Config pointing at an arbitrary base URL, with default timeouts.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            time_offset: chrono::Duration::zero(),
            verify_tls: false,
            timeouts: Timeouts::default(),
            scrollback_limit: DEFAULT_SCROLLBACK_LIMIT,
            log_file: None,
        }
    }

    /// Full URL for an endpoint path such as `login`.
    pub fn address(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
