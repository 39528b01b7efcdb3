//! Error types for session store operations.

/// Error type for session store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The request carries no cookie with the configured name.
    #[error("Session cookie not found")]
    CookieNotFound,

    /// The cookie names an identifier with no live session.
    #[error("Invalid session")]
    InvalidSession,

    /// The session exists but holds no value for the requested key.
    #[error("Invalid key")]
    InvalidKey,

    /// The request's cookie header could not be parsed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response could not carry the session cookie.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The operating system RNG could not supply identifier bytes.
    ///
    /// This is unrecoverable: no identifier is minted when it occurs.
    #[error("Entropy source failed: {0}")]
    Entropy(String),
}

impl Error {
    /// Whether this error signals a broken environment rather than a bad request.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Entropy(_))
    }
}

/// Result type for session store operations.
pub type Result<T> = std::result::Result<T, Error>;
