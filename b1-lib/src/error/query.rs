//! Query translation error types

/// Errors raised while translating a query into a request.
///
/// These are deterministic: the same query always fails the same way, and
/// nothing is sent to the Service Layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// An expression node, operator or function outside the supported set.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Structural misuse of the query API.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A field belongs to an entity that is not part of the query, or an
    /// entity has no resource name.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

impl QueryError {
    /// Creates an unsupported-operation error.
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// Creates an invalid-operation error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }
}
