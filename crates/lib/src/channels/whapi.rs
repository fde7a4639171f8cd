//! Whapi channel: send replies via the Whapi.Cloud REST API (bearer token).
//!
//! Text goes to POST /messages/text; voice notes go to POST /messages/voice
//! with the audio inlined as a base64 data URI.

use crate::config::{resolve_whapi_token, Config};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://gate.whapi.cloud";
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

pub const WHAPI_CHANNEL_ID: &str = "whapi";

/// Whapi channel connector.
pub struct WhapiChannel {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl WhapiChannel {
    pub fn new(base_url: Option<String>, token: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            base_url,
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.channels.whapi.base_url.clone(), resolve_whapi_token(config))
    }

    fn token(&self) -> Result<&str, String> {
        self.token.as_deref().ok_or_else(|| "whapi token not configured".to_string())
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<(), String> {
        let token = self.token()?;
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .timeout(SEND_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("whapi send failed: {} {}", status, body));
        }
        Ok(())
    }
}

/// Inline OGG/Opus bytes as the data URI Whapi accepts for media uploads.
fn voice_data_uri(audio: &[u8]) -> String {
    let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, audio);
    format!("data:audio/ogg;base64,{}", encoded)
}

#[async_trait]
impl crate::channels::ChannelHandle for WhapiChannel {
    fn id(&self) -> &str {
        WHAPI_CHANNEL_ID
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<(), String> {
        self.post_json("/messages/text", json!({ "to": to, "body": body }))
            .await
    }

    async fn send_voice(&self, to: &str, audio: &[u8]) -> Result<(), String> {
        self.post_json(
            "/messages/voice",
            json!({ "to": to, "media": voice_data_uri(audio) }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_data_uri_has_ogg_prefix() {
        let uri = voice_data_uri(b"OggS");
        assert!(uri.starts_with("data:audio/ogg;base64,"));
        assert!(uri.ends_with("T2dnUw=="));
    }
}
