use thiserror::Error;

/// SessionError
///
/// Raised by the Session/Role Store when a caller tries to install a session that
/// would break its invariants. These are programmer errors: a correct Auth API
/// integration never produces them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The role supplied for a new session was empty (or whitespace only).
    #[error("invalid session: role must not be empty")]
    InvalidSession,
}

/// AuthApiError
///
/// Failures reported by the remote Auth API collaborator.
#[derive(Debug, Error)]
pub enum AuthApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout...).
    #[error("auth api unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    /// The API answered with a non-success status (bad credentials, locked account...).
    #[error("auth api rejected the request with status {status}")]
    Rejected { status: u16 },
    /// The API answered 2xx but the body did not match the expected shape.
    #[error("auth api returned an unreadable body: {0}")]
    Decode(String),
}

/// AuthError
///
/// Everything the login/logout flow can return to its caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] AuthApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// NavigationError
///
/// Reasons a navigation registry cannot be built from the supplied entries.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("navigation entry for route '{0}' has an empty title")]
    EmptyTitle(String),
    #[error("navigation route '{0}' must start with '/'")]
    InvalidRoute(String),
    #[error("navigation route '{0}' is registered twice")]
    DuplicateRoute(String),
    #[error("navigation file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("navigation file could not be read: {0}")]
    Io(#[from] std::io::Error),
}
