use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use http::StatusCode;

use crate::core::AppConfig;
use crate::forwarder::{ConversationHistory, Forwarder, ForwarderResult, InboundRequest};

/// Forward one message, printing the same JSON body the API returns.
pub async fn run(config: AppConfig, message: &str, history: Option<&Path>) -> Result<()> {
    let history = match history {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read history file {}", path.display()))?;
            serde_json::from_str::<ConversationHistory>(&raw)
                .with_context(|| format!("Invalid history in {}", path.display()))?
        }
        None => ConversationHistory::new(),
    };

    let forwarder = Forwarder::new(&config)?;
    let (_status, result) =
        send_message(&forwarder, InboundRequest::new(message, history)).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

/// Validate and forward a request built from command line input.
pub async fn send_message(
    forwarder: &Forwarder,
    request: InboundRequest,
) -> (StatusCode, ForwarderResult) {
    let outcome = match request.validate() {
        Ok(()) => forwarder.forward(request, None).await,
        Err(e) => Err(e),
    };
    ForwarderResult::from_outcome(outcome)
}
