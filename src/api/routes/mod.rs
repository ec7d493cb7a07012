//! API routes module

pub mod chat;
pub mod event;

use std::sync::{Arc, RwLock};

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Direct chat requests
        .nest("/chat", chat::router())
        // Gateway event envelopes
        .nest("/event", event::router())
}
