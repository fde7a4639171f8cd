//! Inbound webhook processing: payload adapters, the normalized message
//! model, and the reply pipeline.

pub mod handler;
pub mod inbound;
pub mod payload;

pub use inbound::{InboundMessage, MessageKind};
