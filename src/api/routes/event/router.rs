//! Router for the gateway event API

use std::sync::{Arc, RwLock};

use axum::{Json, Router, body::Bytes, extract::State, routing::post};

use super::public::GatewayResponse;
use crate::api::state::AppState;
use crate::forwarder::event::handle_raw_event;
use crate::forwarder::{ForwardError, ForwarderResult};

type SharedState = Arc<RwLock<AppState>>;

/// Handle an HTTP-style gateway event and answer with the response
/// envelope. The logical status lives in `statusCode`, including for
/// events that fail to parse.
async fn event_handler(State(state): State<SharedState>, body: Bytes) -> Json<GatewayResponse> {
    let forwarder = match state.read() {
        Ok(shared_state) => shared_state.forwarder.clone(),
        Err(_) => {
            let err = ForwardError::Internal("shared state is poisoned".into());
            tracing::error!("{}", err);
            return Json(GatewayResponse::new(
                err.status_code(),
                &ForwarderResult::failure(&err),
            ));
        }
    };

    Json(handle_raw_event(&forwarder, &body).await)
}

/// Create the event router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(event_handler))
}
