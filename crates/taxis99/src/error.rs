//! Client error types

use std::fmt;

use thiserror::Error;

/// Error returned when the API answered but the response could not be used
///
/// Covers non-success status codes and bodies that do not decode into the
/// requested output type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ApiError {
    status: Option<u16>,
    message: String,
}

impl ApiError {
    /// Create a new [`ApiError`]
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code of the response, if one was received
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Human readable description of the failure
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "API error ({}): {}", status, self.message),
            None => write!(f, "API error: {}", self.message),
        }
    }
}

/// Broad class of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request could not be built; the server was never contacted
    Construction,
    /// The request never completed (network failure, timeout, cancellation)
    Transport,
    /// The server responded but the response was unusable
    Api,
}

/// Errors that can occur while talking to the API
#[derive(Debug, Error)]
pub enum Error {
    /// Path is not a valid relative reference
    #[error("Invalid path `{path}`: {reason}")]
    InvalidPath {
        /// Offending path
        path: String,
        /// Why the path was rejected
        reason: String,
    },
    /// Url parse error
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
    /// Method is not a valid HTTP token
    #[error("Invalid HTTP method `{0}`")]
    InvalidMethod(String),
    /// Request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Proxy error
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// Transport build error
    #[error("Client build error: {0}")]
    Build(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    /// Network level failure
    #[error("Transport error: {0}")]
    Transport(String),
    /// Request timeout
    #[error("Request timeout")]
    Timeout,
    /// Request cancelled before it completed
    #[error("Request cancelled")]
    Cancelled,
    /// Unusable response
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidPath { .. }
            | Error::Url(_)
            | Error::InvalidMethod(_)
            | Error::Serialization(_)
            | Error::Proxy(_)
            | Error::Build(_)
            | Error::Config(_) => ErrorKind::Construction,
            Error::Transport(_) | Error::Timeout | Error::Cancelled => ErrorKind::Transport,
            Error::Api(_) => ErrorKind::Api,
        }
    }

    /// The [`ApiError`] carried by this error, if any
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Whether the server responded with an unusable payload
    pub fn is_api_error(&self) -> bool {
        matches!(self, Error::Api(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_builder() {
            Error::Build(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_with_status() {
        let error = ApiError::new(Some(404), "Not Found");
        assert_eq!(format!("{}", error), "API error (404): Not Found");
    }

    #[test]
    fn test_api_error_display_without_status() {
        let error = ApiError::new(None, "expected value");
        assert_eq!(format!("{}", error), "API error: expected value");
    }

    #[test]
    fn test_error_api_is_transparent() {
        let error: Error = ApiError::new(Some(500), "boom").into();
        assert_eq!(format!("{}", error), "API error (500): boom");
    }

    #[test]
    fn test_invalid_method_display() {
        let error = Error::InvalidMethod("ö".to_string());
        assert_eq!(format!("{}", error), "Invalid HTTP method `ö`");
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(format!("{}", Error::Timeout), "Request timeout");
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::InvalidMethod("ö".to_string()).kind(),
            ErrorKind::Construction
        );
        assert_eq!(
            Error::InvalidPath {
                path: ":".to_string(),
                reason: "colon".to_string(),
            }
            .kind(),
            ErrorKind::Construction
        );
        assert_eq!(Error::Transport("refused".to_string()).kind(), ErrorKind::Transport);
        assert_eq!(Error::Cancelled.kind(), ErrorKind::Transport);
        assert_eq!(Error::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(
            Error::from(ApiError::new(None, "bad json")).kind(),
            ErrorKind::Api
        );
    }

    #[test]
    fn test_as_api_error() {
        let error: Error = ApiError::new(Some(502), "Bad Gateway").into();
        let api = error.as_api_error().expect("Should carry an ApiError");
        assert_eq!(api.status(), Some(502));
        assert_eq!(api.message(), "Bad Gateway");
        assert!(error.is_api_error());

        let error = Error::Cancelled;
        assert!(error.as_api_error().is_none());
        assert!(!error.is_api_error());
    }

    #[test]
    fn test_from_serde_json_error() {
        let result: Result<String, _> = serde_json::from_str("not valid json");
        let json_error = result.expect_err("Invalid JSON should produce an error");
        let error: Error = json_error.into();

        assert!(matches!(error, Error::Serialization(_)));
        assert_eq!(error.kind(), ErrorKind::Construction);
    }

    #[test]
    fn test_from_url_parse_error() {
        let parse_error = url::Url::parse("not a url").expect_err("Should not parse");
        let error: Error = parse_error.into();
        assert!(matches!(error, Error::Url(_)));
    }
}
