//! Normalized inbound message: what the pipeline sees regardless of which
//! gateway delivered the webhook event.

use serde_json::Value;

/// What kind of WhatsApp message arrived. Gateways tag the same thing with
/// different strings ("chat" vs "text", "ptt" vs "voice"); [`classify_kind`]
/// folds them into this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Voice,
    Other,
}

/// One inbound WhatsApp message, normalized from a gateway webhook payload.
/// Request-local; dropped once the reply (if any) has been sent.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Generated id for log correlation across the pipeline stages.
    pub event_id: String,
    /// Sender phone id, digits only (the part before `@` in a WhatsApp jid).
    pub sender: String,
    pub kind: MessageKind,
    /// Text body for Text messages (may be empty).
    pub text: Option<String>,
    /// Download URL for Voice messages.
    pub media_url: Option<String>,
    /// Original payload, kept for diagnostics only.
    pub raw: Value,
}

impl InboundMessage {
    pub fn new(sender: String, kind: MessageKind, raw: Value) -> Self {
        Self {
            event_id: format!("evt-{}", uuid::Uuid::new_v4()),
            sender,
            kind,
            text: None,
            media_url: None,
            raw,
        }
    }
}

/// Normalize a gateway message-type tag. "chat"/"text" are text, "ptt"/"voice"/"audio"
/// are voice notes, everything else (stickers, images, locations, missing tag) is Other.
pub fn classify_kind(tag: Option<&str>) -> MessageKind {
    match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        Some("chat") | Some("text") => MessageKind::Text,
        Some("ptt") | Some("voice") | Some("audio") => MessageKind::Voice,
        _ => MessageKind::Other,
    }
}

/// Extract the sender phone id. Prefers an explicit `from` value, falls back to
/// the chat/contact jid; either way the `@<suffix>` part (e.g. `@c.us`,
/// `@s.whatsapp.net`) is stripped. Returns None when no usable id is present.
pub fn normalize_sender(from: Option<&str>, chat_id: Option<&str>) -> Option<String> {
    let candidate = from
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| chat_id.map(str::trim).filter(|s| !s.is_empty()))?;
    let id = candidate.split('@').next().unwrap_or("").trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
