use std::time::Duration;

use anyhow::Result;
use http::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use super::error::{ForwardError, UNREADABLE_BODY};
use super::models::{CallerIdentity, ChatTurn, ConversationHistory, InboundRequest};
use super::provider::{InferenceConfig, ProviderShape};
use crate::core::AppConfig;

/// The reply and the caller's history with the new exchange appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardOutcome {
    pub response: String,
    pub conversation_history: ConversationHistory,
}

/// Forwards one conversation turn to a text-generation provider and
/// merges the reply back into the caller's history.
///
/// Holds no per-conversation state so it can be cloned freely and
/// shared between requests. Every call makes exactly one outbound
/// request and never retries.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: reqwest::Client,
    endpoint: Url,
    shape: ProviderShape,
    inference: InferenceConfig,
    model_id: String,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.provider_url.clone(),
            shape: config.provider_shape,
            inference: InferenceConfig::default(),
            model_id: config.model_id.clone(),
            timeout: config.timeout,
        })
    }

    /// Send the new message along with the history to the provider
    /// and return the reply merged into the history.
    pub async fn forward(
        &self,
        request: InboundRequest,
        identity: Option<&CallerIdentity>,
    ) -> Result<ForwardOutcome, ForwardError> {
        let span = tracing::info_span!(
            "forward",
            request_id = %Uuid::new_v4(),
            shape = %self.shape,
            model = %self.model_id
        );

        async move {
            if let Some(name) = identity.and_then(CallerIdentity::display_name) {
                tracing::info!("Authenticated caller: {}", name);
            }
            tracing::debug!(
                "Processing message with {} prior turns",
                request.conversation_history.len()
            );

            let user_turn = ChatTurn::user(&request.message);
            let payload = self.shape.build_payload(
                &request.conversation_history,
                &user_turn,
                identity,
                &self.inference,
            );
            tracing::debug!("Calling provider with payload: {}", payload);

            let resp = self.call_provider(&payload).await?;
            let reply = self.shape.extract_reply(&resp)?;

            let conversation_history = request
                .conversation_history
                .extended(user_turn, ChatTurn::assistant(&reply));

            Ok(ForwardOutcome {
                response: reply,
                conversation_history,
            })
        }
        .instrument(span)
        .await
    }

    async fn call_provider(&self, payload: &Value) -> Result<Value, ForwardError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|e| {
                tracing::warn!("Failed to read provider error body: {}", e);
                UNREADABLE_BODY.to_string()
            });
            tracing::error!("Provider returned {}: {}", status, body);
            return Err(ForwardError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let resp: Value = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!("Provider response is not JSON: {}", e);
            ForwardError::MalformedResponse(e.to_string())
        })?;
        tracing::debug!("Provider response: {}", resp);

        Ok(resp)
    }

    fn classify(&self, err: reqwest::Error) -> ForwardError {
        tracing::error!("Provider request failed: {:?}", err);
        if err.is_timeout() {
            ForwardError::Timeout(self.timeout)
        } else if err.is_connect() || err.is_request() || err.is_body() || err.is_decode() {
            ForwardError::Connection(err.to_string())
        } else {
            ForwardError::Internal(err.to_string())
        }
    }
}
