//! Form Relay: enriches submitted form messages and relays them to a chat.

pub mod api;
pub mod channels;
pub mod config;
pub mod error;
pub mod identity;
pub mod issuer;
pub mod lookup;
pub mod pipeline;
