//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::{HeaderName, HeaderValue, StatusCode};

use crate::forwarder::event::CORS_HEADERS;
use crate::forwarder::{ForwardError, ForwarderResult};

/// A `ForwarderResult` sent with its status code and the cross-origin
/// headers every caller expects.
pub struct ForwarderReply(pub StatusCode, pub ForwarderResult);

impl IntoResponse for ForwarderReply {
    fn into_response(self) -> Response {
        let mut response = (self.0, Json(self.1)).into_response();
        let headers = response.headers_mut();
        for (name, value) in CORS_HEADERS {
            // Parsing lowercases the mixed-case names
            if let Ok(name) = HeaderName::try_from(name) {
                headers.insert(name, HeaderValue::from_static(value));
            }
        }
        response
    }
}

/// Enables `?` on a `ForwardError` inside a handler returning a
/// `ForwarderReply`.
impl From<ForwardError> for ForwarderReply {
    fn from(err: ForwardError) -> Self {
        tracing::error!("{}", err);
        Self(err.status_code(), ForwarderResult::failure(&err))
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod event {
    pub use crate::api::routes::event::public::*;
}
