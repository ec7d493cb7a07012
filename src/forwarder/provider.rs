//! Payload conventions for the supported text-generation providers.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value, json};

use super::error::ForwardError;
use super::models::{CallerIdentity, ChatTurn, ConversationHistory};

/// Which request/response convention the provider speaks. Chosen at
/// deploy time, never per request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ProviderShape {
    /// Multi-turn messages with content blocks and inference params
    #[default]
    Structured,
    /// Only the newest message as a `prompt`
    Prompt,
    /// History and new turn forwarded verbatim
    Passthrough,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
    pub temperature: f64,
    pub top_p: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            stop_sequences: Vec::new(),
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl ProviderShape {
    /// Build the outbound JSON body for the new user turn.
    pub fn build_payload(
        &self,
        history: &ConversationHistory,
        user_turn: &ChatTurn,
        identity: Option<&CallerIdentity>,
        inference: &InferenceConfig,
    ) -> Value {
        let turns = history.iter().chain(std::iter::once(user_turn));

        match self {
            ProviderShape::Structured => {
                let messages: Vec<Value> = turns
                    .map(|turn| {
                        json!({
                            "role": turn.role,
                            "content": [{"text": turn.content}],
                        })
                    })
                    .collect();
                json!({
                    "messages": messages,
                    "inferenceConfig": inference,
                })
            }
            ProviderShape::Prompt => json!({ "prompt": user_turn.content }),
            ProviderShape::Passthrough => {
                let messages: Vec<&ChatTurn> = turns.collect();
                let mut payload = json!({ "messages": messages });
                if let Some(identity) = identity {
                    payload["userInfo"] = identity.user_info();
                }
                payload
            }
        }
    }

    /// Dotted path of the reply text in a provider response.
    pub fn reply_field(&self) -> &'static str {
        match self {
            ProviderShape::Structured => "output.message.content[0].text",
            ProviderShape::Prompt => "generated_text",
            ProviderShape::Passthrough => "response",
        }
    }

    /// Pull the assistant's reply out of a provider response.
    pub fn extract_reply(&self, resp: &Value) -> Result<String, ForwardError> {
        let reply = match self {
            ProviderShape::Structured => resp["output"]["message"]["content"][0]["text"].as_str(),
            ProviderShape::Prompt => resp["generated_text"].as_str(),
            ProviderShape::Passthrough => resp["response"].as_str(),
        };

        reply
            .map(str::to_string)
            .ok_or_else(|| ForwardError::InvalidResponseShape {
                field: self.reply_field().to_string(),
            })
    }
}

impl fmt::Display for ProviderShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderShape::Structured => "structured",
            ProviderShape::Prompt => "prompt",
            ProviderShape::Passthrough => "passthrough",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProviderShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "structured" | "a" => Ok(ProviderShape::Structured),
            "prompt" | "b" => Ok(ProviderShape::Prompt),
            "passthrough" | "c" => Ok(ProviderShape::Passthrough),
            other => Err(anyhow::anyhow!(
                "Unknown provider shape '{}', expected structured, prompt or passthrough",
                other
            )),
        }
    }
}
