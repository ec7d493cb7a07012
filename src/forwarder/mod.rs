mod error;
pub mod event;
mod forward;
mod models;
mod provider;
mod result;

pub use error::{ForwardError, UNREADABLE_BODY};
pub use forward::{ForwardOutcome, Forwarder};
pub use models::{CallerIdentity, ChatTurn, ConversationHistory, InboundRequest, Role};
pub use provider::{InferenceConfig, ProviderShape};
pub use result::ForwarderResult;
