//! Error types

mod api;
mod auth;
mod query;
mod service_layer;

pub use api::*;
pub use auth::*;
pub use query::*;
pub use service_layer::*;

/// Top-level error returned by client operations.
///
/// Translation failures ([`QueryError`]) are raised before any request is
/// sent; remote failures ([`ApiError`], [`AuthError`]) come back from the
/// Service Layer. Use [`Error::is_translation`] and [`Error::is_remote`] to
/// tell them apart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The query could not be translated into a request.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The Service Layer rejected the request or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login or logout failed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// `first`/`single` found no matching element.
    #[error("Sequence contains no elements")]
    NoElements,

    /// `single` found more than one matching element.
    #[error("Sequence contains more than one element")]
    MoreThanOneElement,

    /// The request was cancelled before a response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Returns `true` if the query itself was malformed.
    pub fn is_translation(&self) -> bool {
        matches!(self, Self::Query(_))
    }

    /// Returns `true` if the failure came from the remote system.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Auth(_))
    }
}
