//! HTTP-style gateway events, for deployments where the forwarder is
//! triggered with an event envelope instead of a direct HTTP request.
use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ForwardError;
use super::forward::Forwarder;
use super::models::{CallerIdentity, InboundRequest};
use super::result::ForwarderResult;

/// Headers attached to every response so browsers on any origin can
/// call the forwarder.
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("Content-Type", "application/json"),
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token",
    ),
    ("Access-Control-Allow-Methods", "OPTIONS,POST"),
];

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct GatewayEvent {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(rename = "requestContext", default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct RequestContext {
    #[serde(default)]
    pub authorizer: Option<Authorizer>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Authorizer {
    #[serde(default)]
    pub claims: Option<Value>,
}

impl GatewayEvent {
    /// Parse a raw event. Anything that isn't a well-formed event is a
    /// validation failure.
    pub fn parse(raw: &[u8]) -> Result<Self, ForwardError> {
        if raw.is_empty() {
            return Err(ForwardError::Validation("event is empty".into()));
        }
        serde_json::from_slice(raw)
            .map_err(|e| ForwardError::Validation(format!("malformed event: {}", e)))
    }

    pub fn new(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            request_context: None,
        }
    }

    /// Claims set by the identity gateway, when present.
    pub fn identity(&self) -> Option<CallerIdentity> {
        let claims = self
            .request_context
            .as_ref()?
            .authorizer
            .as_ref()?
            .claims
            .as_ref()?;
        match claims {
            Value::Object(map) => Some(CallerIdentity::new(map.clone())),
            _ => {
                tracing::warn!("Ignoring authorizer claims that are not an object");
                None
            }
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, result: &ForwarderResult) -> Self {
        let body = serde_json::to_string(result).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize result: {}", e);
            r#"{"success":false,"error":"internal error"}"#.to_string()
        });
        let headers = CORS_HEADERS
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }
}

/// Handle one gateway event. Never fails, every error becomes a
/// failure envelope.
pub async fn handle_event(forwarder: &Forwarder, event: GatewayEvent) -> GatewayResponse {
    let identity = event.identity();

    let outcome = match event.body.as_deref() {
        Some(body) => match InboundRequest::parse(body.as_bytes()) {
            Ok(request) => forwarder.forward(request, identity.as_ref()).await,
            Err(e) => Err(e),
        },
        None => Err(ForwardError::Validation("event has no body".into())),
    };

    let (status, result) = ForwarderResult::from_outcome(outcome);
    GatewayResponse::new(status, &result)
}

/// Handle an event that hasn't been parsed yet, answering malformed
/// events with a 400 envelope.
pub async fn handle_raw_event(forwarder: &Forwarder, raw: &[u8]) -> GatewayResponse {
    match GatewayEvent::parse(raw) {
        Ok(event) => handle_event(forwarder, event).await,
        Err(err) => {
            let (status, result) = ForwarderResult::from_outcome(Err(err));
            GatewayResponse::new(status, &result)
        }
    }
}
