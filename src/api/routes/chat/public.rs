//! Public types for the chat API

/// Request header carrying the identity gateway's claims as a JSON
/// object. Optional.
pub const CALLER_CLAIMS_HEADER: &str = "x-caller-claims";
