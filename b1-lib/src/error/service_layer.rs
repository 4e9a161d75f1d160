//! Service Layer error envelope

use serde::Deserialize;

/// Error information returned by the Service Layer in the response body.
///
/// Both envelope shapes are accepted:
///
/// ```text
/// v1: {"error": {"code": -2028, "message": {"lang": "en-us", "value": "No matching records found"}}}
/// v2: {"error": {"code": "-2028", "message": "No matching records found"}}
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLayerErrorDetail {
    /// The error code (e.g., "-2028").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Message language, when the v1 envelope provides one.
    pub lang: Option<String>,
}

impl ServiceLayerErrorDetail {
    /// Creates a new error detail with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            lang: None,
        }
    }

    /// Parses an error envelope from a response body.
    ///
    /// Returns `None` when the body is not a Service Layer error envelope.
    pub fn from_body(body: &str) -> Option<Self> {
        let envelope: Envelope = serde_json::from_str(body).ok()?;
        let (message, lang) = match envelope.error.message {
            Message::Text(text) => (text, None),
            Message::Localized { lang, value } => (value, lang),
        };
        let code = match envelope.error.code {
            Code::Number(n) => n.to_string(),
            Code::Text(s) => s,
        };
        Some(Self {
            code,
            message,
            lang,
        })
    }
}

impl std::fmt::Display for ServiceLayerErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}) {}", self.code, self.message)
    }
}

#[derive(Deserialize)]
struct Envelope {
    error: Body,
}

#[derive(Deserialize)]
struct Body {
    code: Code,
    message: Message,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Code {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Message {
    Text(String),
    Localized { lang: Option<String>, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_v1_envelope() {
        let body = r#"{"error":{"code":-2028,"message":{"lang":"en-us","value":"No matching records found"}}}"#;
        let detail = ServiceLayerErrorDetail::from_body(body).unwrap();
        assert_eq!(detail.code, "-2028");
        assert_eq!(detail.message, "No matching records found");
        assert_eq!(detail.lang.as_deref(), Some("en-us"));
    }

    #[test]
    fn test_parse_v2_envelope() {
        let body = r#"{"error":{"code":"301","message":"Invalid session or session already timeout."}}"#;
        let detail = ServiceLayerErrorDetail::from_body(body).unwrap();
        assert_eq!(detail.code, "301");
        assert_eq!(detail.to_string(), "(301) Invalid session or session already timeout.");
    }

    #[test]
    fn test_non_envelope_body() {
        assert!(ServiceLayerErrorDetail::from_body("<html>Bad Gateway</html>").is_none());
        assert!(ServiceLayerErrorDetail::from_body(r#"{"value":[]}"#).is_none());
    }
}
