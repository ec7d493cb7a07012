//! Failure taxonomy for a single forwarded conversation turn.
use std::time::Duration;

use http::StatusCode;
use thiserror::Error;

/// Substituted when the upstream error body can't be read.
pub const UNREADABLE_BODY: &str = "<unreadable response body>";

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The inbound request was not valid JSON or was missing fields
    #[error("invalid request: {0}")]
    Validation(String),

    /// The provider answered with a non-2xx status
    #[error("provider returned HTTP {status}")]
    Upstream { status: u16, body: String },

    #[error("provider did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("could not reach provider: {0}")]
    Connection(String),

    /// The provider answered 2xx but the body isn't JSON
    #[error("provider returned a malformed response")]
    MalformedResponse(String),

    /// The provider answered with JSON that lacks the reply field
    #[error("provider response is missing `{field}`")]
    InvalidResponseShape { field: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ForwardError {
    /// HTTP status reported to the caller for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ForwardError::Validation(_) => StatusCode::BAD_REQUEST,
            ForwardError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ForwardError::Timeout(_) | ForwardError::Connection(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ForwardError::MalformedResponse(_) | ForwardError::InvalidResponseShape { .. } => {
                StatusCode::BAD_GATEWAY
            }
            ForwardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Supporting text safe to hand back to the caller, if any.
    pub fn details(&self) -> Option<String> {
        match self {
            ForwardError::Upstream { body, .. } => Some(body.clone()),
            ForwardError::MalformedResponse(reason) => Some(reason.clone()),
            _ => None,
        }
    }
}
