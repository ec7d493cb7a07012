//! Router for the chat API

use std::sync::{Arc, RwLock};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use serde_json::{Map, Value};

use super::public::CALLER_CLAIMS_HEADER;
use crate::api::public::ForwarderReply;
use crate::api::state::AppState;
use crate::forwarder::{CallerIdentity, ForwardError, ForwarderResult, InboundRequest};

type SharedState = Arc<RwLock<AppState>>;

/// Read the caller's claims, ignoring anything that isn't a JSON object.
fn caller_identity(headers: &HeaderMap) -> Option<CallerIdentity> {
    let raw = headers.get(CALLER_CLAIMS_HEADER)?.to_str().ok()?;
    match serde_json::from_str::<Map<String, Value>>(raw) {
        Ok(claims) => Some(CallerIdentity::new(claims)),
        Err(e) => {
            tracing::warn!("Ignoring malformed {} header: {}", CALLER_CLAIMS_HEADER, e);
            None
        }
    }
}

async fn forward_chat(
    state: SharedState,
    headers: HeaderMap,
    body: Bytes,
) -> Result<ForwarderReply, ForwarderReply> {
    let forwarder = state
        .read()
        .map_err(|_| ForwardError::Internal("shared state is poisoned".into()))?
        .forwarder
        .clone();

    let request = InboundRequest::parse(&body)?;
    let identity = caller_identity(&headers);

    let outcome = forwarder.forward(request, identity.as_ref()).await?;
    Ok(ForwarderReply(
        http::StatusCode::OK,
        ForwarderResult::success(outcome),
    ))
}

/// Forward a chat message and its history to the provider
async fn chat_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> ForwarderReply {
    forward_chat(state, headers, body)
        .await
        .unwrap_or_else(|reply| reply)
}

/// Create the chat router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(chat_handler))
}
