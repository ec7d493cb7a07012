//! The JSON body returned to callers for every request.
use http::StatusCode;
use serde::{Deserialize, Serialize};

use super::error::ForwardError;
use super::forward::ForwardOutcome;
use super::models::ConversationHistory;

/// The `success` flag on the wire is derived from the variant, so a
/// body can never claim success while carrying an error.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(into = "ResultBody", try_from = "ResultBody")]
pub enum ForwarderResult {
    Success {
        response: String,
        conversation_history: ConversationHistory,
    },
    Failure {
        error: String,
        details: Option<String>,
    },
}

// Flat wire form of `ForwarderResult`
#[derive(Serialize, Deserialize)]
struct ResultBody {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(
        rename = "conversationHistory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    conversation_history: Option<ConversationHistory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl From<ForwarderResult> for ResultBody {
    fn from(result: ForwarderResult) -> Self {
        match result {
            ForwarderResult::Success {
                response,
                conversation_history,
            } => ResultBody {
                success: true,
                response: Some(response),
                conversation_history: Some(conversation_history),
                error: None,
                details: None,
            },
            ForwarderResult::Failure { error, details } => ResultBody {
                success: false,
                response: None,
                conversation_history: None,
                error: Some(error),
                details,
            },
        }
    }
}

impl TryFrom<ResultBody> for ForwarderResult {
    type Error = String;

    fn try_from(body: ResultBody) -> Result<Self, Self::Error> {
        if body.success {
            match (body.response, body.conversation_history) {
                (Some(response), Some(conversation_history)) => Ok(ForwarderResult::Success {
                    response,
                    conversation_history,
                }),
                _ => Err("successful result needs `response` and `conversationHistory`".into()),
            }
        } else {
            body.error
                .map(|error| ForwarderResult::Failure {
                    error,
                    details: body.details,
                })
                .ok_or_else(|| "failed result needs `error`".to_string())
        }
    }
}

impl ForwarderResult {
    pub fn success(outcome: ForwardOutcome) -> Self {
        ForwarderResult::Success {
            response: outcome.response,
            conversation_history: outcome.conversation_history,
        }
    }

    pub fn failure(err: &ForwardError) -> Self {
        ForwarderResult::Failure {
            error: err.to_string(),
            details: err.details(),
        }
    }

    /// Convert the outcome of a forward into a body and the status
    /// code it should be sent with.
    pub fn from_outcome(outcome: Result<ForwardOutcome, ForwardError>) -> (StatusCode, Self) {
        match outcome {
            Ok(outcome) => (StatusCode::OK, Self::success(outcome)),
            Err(err) => {
                tracing::error!("Forward failed: {}", err);
                (err.status_code(), Self::failure(&err))
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ForwarderResult::Success { .. })
    }
}
