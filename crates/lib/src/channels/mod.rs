//! Outbound messaging channels (UltraMsg, Whapi).
//!
//! Channel trait and registry so the webhook handler can deliver replies
//! through whichever gateway the inbound event arrived on.

mod registry;
mod ultramsg;
mod whapi;

pub use registry::{ChannelHandle, ChannelRegistry};
pub use ultramsg::{UltraMsgChannel, ULTRAMSG_CHANNEL_ID};
pub use whapi::{WhapiChannel, WHAPI_CHANNEL_ID};
