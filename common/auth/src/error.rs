use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Reasons a token string cannot be turned into claims.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedToken {
    #[error("expected 3 dot-separated segments, found {0}")]
    SegmentCount(usize),
    #[error("payload segment is not valid base64url: {0}")]
    Base64(String),
    #[error("payload is not valid JSON: {0}")]
    Json(String),
    #[error("payload is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no session token present")]
    MissingToken,
    #[error("malformed session token: {0}")]
    MalformedToken(#[from] MalformedToken),
    #[error("role {role:?} is not allowed; required one of: {}", required.join(", "))]
    Forbidden {
        role: Option<String>,
        required: Vec<String>,
    },
}

impl AuthError {
    /// Missing and malformed tokens are both "no session" for routing purposes.
    pub fn is_session_error(&self) -> bool {
        matches!(self, AuthError::MissingToken | AuthError::MalformedToken(_))
    }
}
