//! Public types for the gateway event API
pub use crate::forwarder::event::{Authorizer, GatewayEvent, GatewayResponse, RequestContext};
