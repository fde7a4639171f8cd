//! The reply pipeline: classify the inbound message, transcribe voice notes,
//! generate a reply, send it back through the channel it arrived on.
//!
//! Every failure past the parse stage still produces a reply: errors are
//! caught here, logged, and converted into one of the fixed messages below.
//! At most one outbound send happens per inbound event.

use crate::server::AppState;
use crate::webhook::inbound::{InboundMessage, MessageKind};

/// Friendly prompt for an empty text message. An empty body gets this nudge
/// rather than silence.
pub const REPLY_EMPTY_TEXT: &str =
    "مرحبا بيك! 🍽️ كتب لينا الطلب ديالك ولا صيفطو برسالة صوتية.";

/// Sent for stickers, images, locations and any other unsupported kind.
pub const REPLY_UNSUPPORTED: &str =
    "سمح لينا، كنقبلو غير الرسائل المكتوبة والصوتية. كتب لينا الطلب ديالك من فضلك. 🙏";

/// Sent when a voice note has no media URL or the download fails upstream.
pub const REPLY_VOICE_UNAVAILABLE: &str =
    "ما قدرناش نحمّلو الرسالة الصوتية ديالك. عاود صيفط الطلب مكتوب من فضلك.";

/// Sent when transcription fails or comes back empty.
pub const REPLY_TRANSCRIBE_FAILED: &str =
    "ما فهمناش مزيان الرسالة الصوتية. ممكن تعاودها ولا تكتب الطلب ديالك؟";

/// Sent when reply generation fails; never empty, since it becomes the
/// message the customer sees.
pub const REPLY_GENERATION_FAILED: &str =
    "سمح لينا، وقع مشكل تقني صغير. عاود جرب من بعد شوية. 🙏";

/// Process one normalized inbound message end to end. Never returns an
/// error: the webhook acknowledgement upstream does not depend on what
/// happens here.
pub async fn handle_event(state: &AppState, channel_id: &str, msg: InboundMessage) {
    match msg.kind {
        MessageKind::Text => {
            let body = msg.text.as_deref().unwrap_or("").trim().to_string();
            if body.is_empty() {
                log::info!("{}: empty text from {}, sending default prompt", msg.event_id, msg.sender);
                send_text(state, channel_id, &msg, REPLY_EMPTY_TEXT).await;
            } else {
                generate_and_send(state, channel_id, &msg, &body, false).await;
            }
        }
        MessageKind::Voice => match msg.media_url.as_deref() {
            None => {
                log::warn!("{}: voice message without a media url from {}", msg.event_id, msg.sender);
                send_text(state, channel_id, &msg, REPLY_VOICE_UNAVAILABLE).await;
            }
            Some(url) => match state.transcriber.transcribe_url(url).await {
                Ok(transcript) => {
                    log::info!(
                        "{}: transcribed voice note ({} chars)",
                        msg.event_id,
                        transcript.chars().count()
                    );
                    generate_and_send(state, channel_id, &msg, &transcript, true).await;
                }
                Err(e) => {
                    log::warn!("{}: transcription failed: {}", msg.event_id, e);
                    send_text(state, channel_id, &msg, REPLY_TRANSCRIBE_FAILED).await;
                }
            },
        },
        MessageKind::Other => {
            log::info!("{}: unsupported message kind from {}", msg.event_id, msg.sender);
            send_text(state, channel_id, &msg, REPLY_UNSUPPORTED).await;
        }
    }
}

/// Generate the reply for usable text and deliver it. Generation failures
/// become the fixed apology; voice replies fall back to text on any failure.
async fn generate_and_send(
    state: &AppState,
    channel_id: &str,
    msg: &InboundMessage,
    user_text: &str,
    was_voice: bool,
) {
    let reply = match state.chat.reply(user_text).await {
        Ok(r) => r,
        Err(e) => {
            log::warn!("{}: reply generation failed: {}", msg.event_id, e);
            send_text(state, channel_id, msg, REPLY_GENERATION_FAILED).await;
            return;
        }
    };
    if was_voice && state.config.openai.voice_replies && send_voice(state, channel_id, msg, &reply).await {
        return;
    }
    send_text(state, channel_id, msg, &reply).await;
}

/// Try to deliver the reply as a voice note. Returns false (caller sends
/// text instead) when synthesis or the channel upload fails.
async fn send_voice(state: &AppState, channel_id: &str, msg: &InboundMessage, reply: &str) -> bool {
    let audio = match state.speech.synthesize(reply).await {
        Ok(a) => a,
        Err(e) => {
            log::debug!("{}: speech synthesis failed, falling back to text: {}", msg.event_id, e);
            return false;
        }
    };
    let Some(handle) = state.channels.get(channel_id).await else {
        return false;
    };
    match handle.send_voice(&msg.sender, &audio).await {
        Ok(()) => {
            log::info!("{}: voice reply sent to {}", msg.event_id, msg.sender);
            true
        }
        Err(e) => {
            log::debug!("{}: voice send failed, falling back to text: {}", msg.event_id, e);
            false
        }
    }
}

/// Deliver a text reply. Delivery failure is logged and swallowed; the
/// webhook has already been acknowledged as far as the caller is concerned.
async fn send_text(state: &AppState, channel_id: &str, msg: &InboundMessage, body: &str) {
    let Some(handle) = state.channels.get(channel_id).await else {
        log::warn!("{}: channel {} not registered, dropping reply", msg.event_id, channel_id);
        return;
    };
    if let Err(e) = handle.send_text(&msg.sender, body).await {
        log::warn!("{}: send via {} failed: {}", msg.event_id, channel_id, e);
    } else {
        log::info!("{}: reply sent to {} via {}", msg.event_id, msg.sender, channel_id);
    }
}
