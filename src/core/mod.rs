//! Relay core
//!
//! Turns a client conversation into an upstream completion request and
//! hands back the assistant's reply.

mod relay;

pub use relay::ChatRelay;
