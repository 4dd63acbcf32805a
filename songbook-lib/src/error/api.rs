//! API error types

use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur during API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the API.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// CMS error code (`extensions.code`), if available.
        code: Option<String>,
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

/// Error envelope returned by the CMS: `{"errors": [{"message", "extensions": {"code"}}]}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    message: String,
    #[serde(default)]
    extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct ErrorExtensions {
    code: Option<String>,
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            code: None,
        }
    }

    /// Creates an HTTP error from a response body.
    ///
    /// The first entry of a CMS error envelope provides message and code;
    /// any other body is kept verbatim as the message.
    pub fn from_body(status: u16, body: String) -> Self {
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) if !envelope.errors.is_empty() => {
                let first = envelope.errors.into_iter().next();
                let (message, code) = first
                    .map(|e| (e.message, e.extensions.and_then(|x| x.code)))
                    .unwrap_or_default();
                Self::Http {
                    status,
                    message,
                    code,
                }
            }
            _ => Self::http(status, body),
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

    /// Returns the CMS error code if available.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns `true` if this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
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
    fn test_from_body_reads_error_envelope() {
        let body = r#"{"errors":[{"message":"You don't have permission to access this.","extensions":{"code":"FORBIDDEN"}}]}"#;
        let error = ApiError::from_body(403, body.to_string());
        assert_eq!(error.status_code(), Some(403));
        assert_eq!(error.error_code(), Some("FORBIDDEN"));
        assert_eq!(
            error.to_string(),
            "HTTP 403: You don't have permission to access this."
        );
    }

    #[test]
    fn test_from_body_keeps_plain_text() {
        let error = ApiError::from_body(502, "Bad Gateway".to_string());
        assert_eq!(error.error_code(), None);
        assert_eq!(error.to_string(), "HTTP 502: Bad Gateway");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_from_body_empty_errors_list() {
        let error = ApiError::from_body(400, r#"{"errors":[]}"#.to_string());
        assert_eq!(error.to_string(), r#"HTTP 400: {"errors":[]}"#);
    }
}
