use common_auth::AuthError;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no active session")]
    NoSession,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("session has no operating branch")]
    NoBranch,
    #[error("backend rejected the session token")]
    Unauthorized,
    #[error("backend returned HTTP {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("login response did not contain a token")]
    MissingToken,
    #[error("{0}")]
    Validation(&'static str),
}

impl ClientError {
    /// Errors that mean the current session can no longer be used: the backend
    /// rejected the token, or the token is gone or unreadable.
    pub fn ends_session(&self) -> bool {
        match self {
            ClientError::Unauthorized | ClientError::NoSession => true,
            ClientError::Auth(err) => err.is_session_error(),
            _ => false,
        }
    }
}
