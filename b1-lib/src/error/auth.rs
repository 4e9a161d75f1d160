//! Session error types

/// Errors that can occur while opening or closing a Service Layer session.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Company database, user name or password was rejected.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The session timed out and could not be renewed.
    #[error("Session expired")]
    SessionExpired,

    /// The Service Layer refused the login or logout request.
    #[error("Login rejected (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the Service Layer.
        message: String,
    },

    /// Network error during login or logout.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse the login response.
    #[error("Auth response parse error: {0}")]
    Parse(String),
}
