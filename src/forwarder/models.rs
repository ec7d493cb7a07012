//! Conversation types exchanged with callers.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::ForwardError;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
        }
    }

    pub fn user(content: &str) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: &str) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Chronologically ordered turns. The caller owns the history across
/// calls, it is never stored here.
#[derive(Clone, Default, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<ChatTurn>);

impl ConversationHistory {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_turns(turns: Vec<ChatTurn>) -> Self {
        Self(turns)
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatTurn> {
        self.0.iter()
    }

    /// Returns a copy of the history with the user turn and then the
    /// assistant turn appended.
    pub fn extended(&self, user: ChatTurn, assistant: ChatTurn) -> Self {
        let mut turns = Vec::with_capacity(self.0.len() + 2);
        turns.extend_from_slice(&self.0);
        turns.push(user);
        turns.push(assistant);
        Self(turns)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct InboundRequest {
    pub message: String,
    #[serde(rename = "conversationHistory", default)]
    pub conversation_history: ConversationHistory,
}

impl InboundRequest {
    pub fn new(message: &str, conversation_history: ConversationHistory) -> Self {
        Self {
            message: message.to_string(),
            conversation_history,
        }
    }

    /// Parse a raw request body.
    pub fn parse(body: &[u8]) -> Result<Self, ForwardError> {
        if body.is_empty() {
            return Err(ForwardError::Validation("request body is empty".into()));
        }
        let request: InboundRequest = serde_json::from_slice(body)
            .map_err(|e| ForwardError::Validation(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Checks that apply however the request was built.
    pub fn validate(&self) -> Result<(), ForwardError> {
        if self.message.trim().is_empty() {
            return Err(ForwardError::Validation("`message` must not be empty".into()));
        }
        Ok(())
    }
}

/// Claims injected by the upstream identity gateway. Treated as
/// opaque apart from a few fields used for logging and forwarding.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct CallerIdentity(Map<String, Value>);

impl CallerIdentity {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    fn claim(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.claim("email").or_else(|| self.claim("cognito:username"))
    }

    /// The subset of claims forwarded to the provider.
    pub fn user_info(&self) -> Value {
        let mut info = Map::new();
        for (claim, key) in [
            ("sub", "sub"),
            ("email", "email"),
            ("cognito:username", "username"),
        ] {
            if let Some(value) = self.claim(claim) {
                info.insert(key.to_string(), Value::String(value.to_string()));
            }
        }
        Value::Object(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_parses_request_without_history() {
        let req = InboundRequest::parse(br#"{"message": "hi"}"#).unwrap();
        assert_eq!(req.message, "hi");
        assert!(req.conversation_history.is_empty());
    }

    #[test]
    fn it_parses_request_with_history() {
        let body = json!({
            "message": "and then?",
            "conversationHistory": [
                {"role": "user", "content": "tell me a story"},
                {"role": "assistant", "content": "once upon a time"}
            ]
        })
        .to_string();
        let req = InboundRequest::parse(body.as_bytes()).unwrap();
        assert_eq!(req.conversation_history.len(), 2);
        assert_eq!(req.conversation_history.turns()[1].role, Role::Assistant);
    }

    #[test]
    fn it_rejects_missing_message() {
        let err = InboundRequest::parse(br#"{"conversationHistory": []}"#).unwrap_err();
        assert!(matches!(err, ForwardError::Validation(_)));
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn it_rejects_blank_message_and_bad_json() {
        assert!(matches!(
            InboundRequest::parse(br#"{"message": "   "}"#),
            Err(ForwardError::Validation(_))
        ));
        assert!(matches!(
            InboundRequest::parse(b"{not json"),
            Err(ForwardError::Validation(_))
        ));
        assert!(matches!(
            InboundRequest::parse(b""),
            Err(ForwardError::Validation(_))
        ));
    }

    #[test]
    fn it_validates_constructed_requests() {
        assert!(InboundRequest::new("hi", ConversationHistory::new()).validate().is_ok());
        for blank in ["", " ", "\n\t"] {
            let err = InboundRequest::new(blank, ConversationHistory::new())
                .validate()
                .unwrap_err();
            assert!(matches!(err, ForwardError::Validation(_)));
        }
    }

    #[test]
    fn it_rejects_unknown_roles() {
        let body = json!({
            "message": "hi",
            "conversationHistory": [{"role": "system", "content": "be nice"}]
        })
        .to_string();
        assert!(matches!(
            InboundRequest::parse(body.as_bytes()),
            Err(ForwardError::Validation(_))
        ));
    }

    #[test]
    fn it_extends_history_without_touching_prior_turns() {
        let history = ConversationHistory::new_with_turns(vec![
            ChatTurn::user("a"),
            ChatTurn::assistant("b"),
        ]);
        let next = history.extended(ChatTurn::user("c"), ChatTurn::assistant("d"));

        assert_eq!(history.len(), 2);
        assert_eq!(next.len(), 4);
        assert_eq!(&next.turns()[..2], history.turns());
        assert_eq!(next.turns()[2], ChatTurn::user("c"));
        assert_eq!(next.turns()[3], ChatTurn::assistant("d"));
    }

    #[test]
    fn it_selects_identity_fields() {
        let claims = json!({
            "sub": "abc-123",
            "cognito:username": "alice",
            "email_verified": "true",
            "custom:tier": "gold"
        });
        let identity = CallerIdentity::new(claims.as_object().unwrap().clone());

        assert_eq!(identity.display_name(), Some("alice"));
        assert_eq!(
            identity.user_info(),
            json!({"sub": "abc-123", "username": "alice"})
        );
    }
}
