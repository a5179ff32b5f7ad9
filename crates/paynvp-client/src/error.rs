//! Gateway client error types.
//!
//! Every operation returns `Result<_, GatewayError>`. Two variants cover
//! failures of the HTTP exchange itself:
//!
//! - [`GatewayError::Transport`]: the gateway answered with a 4xx or 5xx
//!   status, or with a body that could not be read. Carries the request
//!   (method, URL) and the response (status, body).
//! - [`GatewayError::Request`]: anything else that went wrong while
//!   dispatching (connection refused, timeout, request build failure). This is
//!   the soft channel; [`ErrorReply`] renders it as the
//!   `{"type": "error", "message": ...}` value callers may already expect.

use paynvp_core::CurrencyError;
use serde::Serialize;

use crate::config::ConfigError;

/// Errors from gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Missing or invalid configuration. Raised before any network call.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Currency outside the whitelist.
    #[error(transparent)]
    Currency(#[from] CurrencyError),
    /// Gateway returned an HTTP error status or a malformed response.
    #[error("{method} request to {url} failed with HTTP {status}: {body}")]
    Transport {
        method: String,
        url: String,
        status: u16,
        body: String,
    },
    /// The exchange failed without an HTTP error response.
    #[error("{method} request to {url} failed: {message}")]
    Request {
        method: String,
        url: String,
        message: String,
    },
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
}

impl GatewayError {
    /// True for the soft failure channel.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Currency(_))
    }

    /// The HTTP status, for transport failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The structured `{type: "error", message}` form of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

impl From<&GatewayError> for ErrorReply {
    fn from(err: &GatewayError) -> Self {
        let message = match err {
            GatewayError::Request { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            kind: "error",
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_errors_are_request_failures_only() {
        let soft = GatewayError::Request {
            method: "RefundTransaction".into(),
            url: "https://api.example.com/nvp".into(),
            message: "connection refused".into(),
        };
        let hard = GatewayError::Transport {
            method: "RefundTransaction".into(),
            url: "https://api.example.com/nvp".into(),
            status: 500,
            body: "oops".into(),
        };
        assert!(soft.is_soft());
        assert!(!hard.is_soft());
        assert_eq!(hard.status(), Some(500));
        assert_eq!(soft.status(), None);
    }

    #[test]
    fn transport_display_carries_request_and_response_context() {
        let err = GatewayError::Transport {
            method: "TransactionSearch".into(),
            url: "https://api.example.com/nvp".into(),
            status: 503,
            body: "unavailable".into(),
        };
        let text = err.to_string();
        assert!(text.contains("TransactionSearch"));
        assert!(text.contains("https://api.example.com/nvp"));
        assert!(text.contains("503"));
        assert!(text.contains("unavailable"));
    }

    #[test]
    fn error_reply_serializes_with_type_field() {
        let err = GatewayError::Request {
            method: "DoVoid".into(),
            url: "https://api.example.com/nvp".into(),
            message: "timed out".into(),
        };
        let reply = ErrorReply::from(&err);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json, serde_json::json!({"type": "error", "message": "timed out"}));
    }

    #[test]
    fn config_errors_are_classified() {
        let err = GatewayError::from(ConfigError::CredentialsNotFound);
        assert!(err.is_config());
        assert!(err.to_string().contains("settings not found"));
        let err = GatewayError::from(CurrencyError::Unsupported("XYZ".into()));
        assert!(err.is_config());
    }
}
