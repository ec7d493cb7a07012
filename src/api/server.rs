use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::Router;
use http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::AppConfig;

/// Answers preflight requests and tags responses with
/// `Access-Control-Allow-Origin: *`.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::OPTIONS, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-amz-date"),
            header::AUTHORIZATION,
            HeaderName::from_static("x-api-key"),
            HeaderName::from_static("x-amz-security-token"),
            HeaderName::from_static(routes::chat::public::CALLER_CLAIMS_HEADER),
        ])
}

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    Router::new()
        .nest("/api", routes::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    let app_state = AppState::from_config(&config)?;
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!(
        "Server started. Listening on {}, forwarding to {} ({} shape, model {})",
        listener.local_addr()?,
        config.provider_url,
        config.provider_shape,
        config.model_id,
    );

    axum::serve(listener, app).await?;

    Ok(())
}
