//! Webhook HTTP server: health route plus one webhook route per gateway.
//!
//! Webhook routes always acknowledge with 200 `{"ok": true}`. A non-2xx
//! response makes the gateway redeliver the same event, so parse and pipeline
//! failures are logged here and never surface in the HTTP response.

use crate::channels::{
    ChannelRegistry, UltraMsgChannel, WhapiChannel, ULTRAMSG_CHANNEL_ID, WHAPI_CHANNEL_ID,
};
use crate::config::Config;
use crate::openai::{ChatClient, SpeechClient, TranscribeClient};
use crate::webhook::inbound::InboundMessage;
use crate::webhook::{handler, payload};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared state for the webhook server: immutable config and the outbound
/// clients, constructed once at startup and passed explicitly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat: ChatClient,
    pub transcriber: TranscribeClient,
    pub speech: SpeechClient,
    pub channels: Arc<ChannelRegistry>,
}

/// Build the process-wide state from config. Both channels are always
/// registered; an unconfigured channel rejects sends with a config error,
/// which the pipeline logs like any other delivery failure.
pub async fn build_state(config: Config) -> AppState {
    let channels = ChannelRegistry::new();
    channels
        .register(Arc::new(UltraMsgChannel::from_config(&config)))
        .await;
    channels
        .register(Arc::new(WhapiChannel::from_config(&config)))
        .await;
    AppState {
        chat: ChatClient::from_config(&config),
        transcriber: TranscribeClient::from_config(&config),
        speech: SpeechClient::from_config(&config),
        channels: Arc::new(channels),
        config: Arc::new(config),
    }
}

/// Build the router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/ultramsg/webhook", post(ultramsg_webhook))
        .route("/whapi/webhook", post(whapi_webhook))
        .with_state(state)
}

/// GET / returns the fixed probe body.
async fn health() -> &'static str {
    "Bot is running"
}

fn ack() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// POST /ultramsg/webhook — UltraMsg event JSON.
async fn ultramsg_webhook(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    process_webhook(&state, ULTRAMSG_CHANNEL_ID, payload::parse_ultramsg, &body).await;
    ack()
}

/// POST /whapi/webhook — Whapi event JSON.
async fn whapi_webhook(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    process_webhook(&state, WHAPI_CHANNEL_ID, payload::parse_whapi, &body).await;
    ack()
}

/// Top-level catch-and-acknowledge boundary.
async fn process_webhook(
    state: &AppState,
    channel_id: &str,
    parse: fn(&Value) -> Option<InboundMessage>,
    body: &[u8],
) {
    let raw: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("{} webhook: unreadable body: {}", channel_id, e);
            return;
        }
    };
    match parse(&raw) {
        Some(msg) => {
            log::info!(
                "{}: inbound {:?} message from {} via {}",
                msg.event_id,
                msg.kind,
                msg.sender,
                channel_id
            );
            handler::handle_event(state, channel_id, msg).await;
        }
        None => log::debug!("{} webhook: no actionable message", channel_id),
    }
}

/// Run the webhook server; binds to config.server.bind:config.server.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_server(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    let state = build_state(config).await;
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("webhook server listening on {}", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("webhook server exited")?;
    log::info!("webhook server stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}
