//! Gateway payload adapters: one named function per supported webhook shape.
//!
//! Each adapter reads exactly the fields its gateway documents and returns a
//! normalized [`InboundMessage`], or None when the payload holds nothing
//! actionable (no message, no resolvable sender, or an echo of our own send).
//! Adapters never fail the request; unusable payloads are acknowledged upstream.

use crate::webhook::inbound::{classify_kind, normalize_sender, InboundMessage, MessageKind};
use serde_json::Value;

fn str_field<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// UltraMsg webhook shape: fields nested under `data`
/// (`data.from`, `data.type`, `data.body`, `data.media`, `data.fromMe`).
pub fn parse_ultramsg(raw: &Value) -> Option<InboundMessage> {
    let data = raw.get("data")?;
    if data.get("fromMe").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    let sender = normalize_sender(str_field(data, "from"), str_field(data, "chatId"))?;
    let kind = classify_kind(str_field(data, "type"));
    let mut msg = InboundMessage::new(sender, kind, raw.clone());
    match kind {
        MessageKind::Text => {
            msg.text = Some(str_field(data, "body").unwrap_or("").to_string());
        }
        MessageKind::Voice => {
            // Voice notes carry the download URL in `media`; some instances
            // duplicate it into `body`.
            msg.media_url =
                non_empty(str_field(data, "media")).or_else(|| non_empty(str_field(data, "body")));
        }
        MessageKind::Other => {}
    }
    Some(msg)
}

/// Whapi webhook shape: a `messages` array; the first entry carries
/// `from`/`chat_id`, `type`, `text.body` and `voice.link`/`audio.link`.
pub fn parse_whapi(raw: &Value) -> Option<InboundMessage> {
    let first = raw.get("messages")?.as_array()?.first()?;
    if first.get("from_me").and_then(Value::as_bool).unwrap_or(false) {
        return None;
    }
    let sender = normalize_sender(str_field(first, "from"), str_field(first, "chat_id"))?;
    let kind = classify_kind(str_field(first, "type"));
    let mut msg = InboundMessage::new(sender, kind, raw.clone());
    match kind {
        MessageKind::Text => {
            msg.text = Some(
                first
                    .get("text")
                    .and_then(|t| str_field(t, "body"))
                    .unwrap_or("")
                    .to_string(),
            );
        }
        MessageKind::Voice => {
            msg.media_url = ["voice", "audio", "ptt"]
                .iter()
                .find_map(|k| first.get(k).and_then(|m| non_empty(str_field(m, "link"))));
        }
        MessageKind::Other => {}
    }
    Some(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ultramsg_text_message_normalizes() {
        let raw = json!({
            "event_type": "message_received",
            "instanceId": "instance42",
            "data": {
                "id": "false_212612345678@c.us_ABCD",
                "from": "212612345678@c.us",
                "to": "212698765432@c.us",
                "type": "chat",
                "body": "واش عندكم طاكوس؟",
                "media": "",
                "fromMe": false
            }
        });
        let msg = parse_ultramsg(&raw).expect("parsed");
        assert_eq!(msg.sender, "212612345678");
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.text.as_deref(), Some("واش عندكم طاكوس؟"));
        assert!(msg.media_url.is_none());
    }

    #[test]
    fn ultramsg_voice_note_carries_media_url() {
        let raw = json!({
            "data": {
                "from": "212612345678@c.us",
                "type": "ptt",
                "body": "",
                "media": "https://media.example/voice.oga",
                "fromMe": false
            }
        });
        let msg = parse_ultramsg(&raw).expect("parsed");
        assert_eq!(msg.kind, MessageKind::Voice);
        assert_eq!(msg.media_url.as_deref(), Some("https://media.example/voice.oga"));
    }

    #[test]
    fn ultramsg_own_message_echo_is_skipped() {
        let raw = json!({
            "data": { "from": "212612345678@c.us", "type": "chat", "body": "hi", "fromMe": true }
        });
        assert!(parse_ultramsg(&raw).is_none());
    }

    #[test]
    fn ultramsg_without_data_is_not_actionable() {
        assert!(parse_ultramsg(&json!({"event_type": "message_ack"})).is_none());
        assert!(parse_ultramsg(&json!({"data": {"type": "chat", "body": "hi"}})).is_none());
    }

    #[test]
    fn whapi_text_message_normalizes() {
        // The documented example payload, verbatim.
        let raw = json!({
            "messages": [{
                "type": "text",
                "from": "213600000000",
                "text": { "body": "السلام، واش عندكم فالمنيو؟" }
            }]
        });
        let msg = parse_whapi(&raw).expect("parsed");
        assert_eq!(msg.sender, "213600000000");
        assert_eq!(msg.kind, MessageKind::Text);
        assert_eq!(msg.text.as_deref(), Some("السلام، واش عندكم فالمنيو؟"));
    }

    #[test]
    fn whapi_sender_falls_back_to_chat_id() {
        let raw = json!({
            "messages": [{
                "type": "text",
                "chat_id": "213600000000@s.whatsapp.net",
                "text": { "body": "slm" }
            }]
        });
        let msg = parse_whapi(&raw).expect("parsed");
        assert_eq!(msg.sender, "213600000000");
    }

    #[test]
    fn whapi_voice_with_link() {
        let raw = json!({
            "messages": [{
                "type": "voice",
                "from": "213600000000",
                "voice": { "link": "https://media.example/note.oga", "seconds": 4 }
            }]
        });
        let msg = parse_whapi(&raw).expect("parsed");
        assert_eq!(msg.kind, MessageKind::Voice);
        assert_eq!(msg.media_url.as_deref(), Some("https://media.example/note.oga"));
    }

    #[test]
    fn whapi_voice_without_link_has_no_media_url() {
        let raw = json!({
            "messages": [{ "type": "voice", "from": "213600000000", "voice": { "seconds": 4 } }]
        });
        let msg = parse_whapi(&raw).expect("parsed");
        assert_eq!(msg.kind, MessageKind::Voice);
        assert!(msg.media_url.is_none());
    }

    #[test]
    fn whapi_empty_messages_is_not_actionable() {
        assert!(parse_whapi(&json!({"messages": []})).is_none());
        assert!(parse_whapi(&json!({"statuses": [{"id": "x"}]})).is_none());
    }

    #[test]
    fn whapi_own_message_echo_is_skipped() {
        let raw = json!({
            "messages": [{ "type": "text", "from_me": true, "from": "213600000000", "text": {"body": "echo"} }]
        });
        assert!(parse_whapi(&raw).is_none());
    }

    #[test]
    fn unknown_kind_is_other() {
        let raw = json!({
            "messages": [{ "type": "image", "from": "213600000000" }]
        });
        let msg = parse_whapi(&raw).expect("parsed");
        assert_eq!(msg.kind, MessageKind::Other);
    }
}
