//! API error types

use std::time::Duration;

use super::ServiceLayerErrorDetail;

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the Service Layer.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Service Layer error code, if available.
        code: Option<String>,
        /// Parsed error envelope.
        detail: Option<Box<ServiceLayerErrorDetail>>,
    },

    /// Network error during API call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse API response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: None,
            detail: None,
        }
    }

    /// Creates an HTTP error from a raw response body.
    ///
    /// When the body holds a Service Layer error envelope, its code and
    /// message are used; otherwise the body itself becomes the message.
    pub fn from_response_body(status: u16, body: String) -> Self {
        match ServiceLayerErrorDetail::from_body(&body) {
            Some(detail) => Self::Http {
                status,
                message: detail.to_string(),
                code: Some(detail.code.clone()),
                detail: Some(Box::new(detail)),
            },
            None => Self::http(status, body),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the Service Layer error code if available.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns the parsed error envelope if available.
    pub fn detail(&self) -> Option<&ServiceLayerErrorDetail> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::Timeout(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_envelope_body() {
        let body = r#"{"error":{"code":-10,"message":{"lang":"en-us","value":"Invalid BP code"}}}"#;
        let error = ApiError::from_response_body(400, body.to_string());
        assert_eq!(error.status_code(), Some(400));
        assert_eq!(error.error_code(), Some("-10"));
        assert_eq!(error.to_string(), "HTTP 400: (-10) Invalid BP code");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_from_plain_body() {
        let error = ApiError::from_response_body(502, "Bad Gateway".to_string());
        assert_eq!(error.error_code(), None);
        assert!(error.detail().is_none());
        assert!(error.is_retryable());
    }
}
