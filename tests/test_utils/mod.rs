//! Test utilities for integration tests
#![allow(dead_code)]
use std::sync::{Arc, RwLock};
use std::time::Duration;

use axum::{Router, body::Body};

use relay::api::AppState;
use relay::api::app;
use relay::core::AppConfig;
use relay::forwarder::ProviderShape;

/// Creates a test application router that forwards to `provider_url`
/// using the given payload convention.
pub fn test_app(provider_url: &str, shape: ProviderShape) -> Router {
    test_app_with_timeout(provider_url, shape, Duration::from_secs(5))
}

pub fn test_app_with_timeout(provider_url: &str, shape: ProviderShape, timeout: Duration) -> Router {
    let app_config = AppConfig::new(provider_url, shape, timeout, "test-model")
        .expect("Invalid test config");
    let app_state = AppState::from_config(&app_config).expect("Failed to build app state");
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    let body = body_to_string(body).await;
    serde_json::from_str(&body).expect("Body is not JSON")
}

/// Address of a server that accepts connections and never answers.
pub async fn unresponsive_provider() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Address nothing is listening on.
pub async fn refused_provider() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
