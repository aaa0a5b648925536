// Error taxonomy shared by the request issuer, the router and the screens.
// Every variant is recoverable: screens turn them into text and let the user
// retry. Only `SessionExpired` changes navigation (back to the login screen).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Connection, DNS or TLS failure before a response was received.
    #[error("error making request: {0}")]
    Transport(String),

    #[error("timeout error: the server did not answer in time")]
    Timeout,

    #[error("bad credentials")]
    BadCredentials,

    #[error("session expired: login again")]
    SessionExpired,

    /// Blocked locally, never sent. Holds the rejected command.
    #[error("You can't stop the server")]
    UserRejected(String),

    #[error("task {0} not valid")]
    UnknownTask(String),

    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
