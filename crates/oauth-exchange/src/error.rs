//! Error types for a single exchange attempt
//!
//! Every variant is terminal for the attempt that produced it. Nothing in
//! this crate retries; the caller decides whether to restart the login flow.

use serde::Serialize;

/// Errors from an OAuth code exchange attempt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authorization code is missing")]
    MissingAuthorizationCode,

    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    #[error("transport error: {0}")]
    Transport(String),

    /// The provider rejected the code or answered without a usable token.
    /// `body` is the raw response body, kept for diagnostics only; it can hold
    /// a token, so it is not part of the message.
    #[error("token exchange failed ({status})")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("user info fetch failed: {0}")]
    UserInfoFetchFailed(String),
}

/// Stable, serializable name for each error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingAuthorizationCode,
    UnknownProvider,
    TransportError,
    TokenExchangeFailed,
    UserInfoFetchFailed,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingAuthorizationCode => ErrorKind::MissingAuthorizationCode,
            Error::UnknownProvider(_) => ErrorKind::UnknownProvider,
            Error::Transport(_) => ErrorKind::TransportError,
            Error::TokenExchangeFailed { .. } => ErrorKind::TokenExchangeFailed,
            Error::UserInfoFetchFailed(_) => ErrorKind::UserInfoFetchFailed,
        }
    }
}

/// Result alias for exchange operations.
pub type Result<T> = std::result::Result<T, Error>;
