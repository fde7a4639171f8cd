//! UltraMsg channel: send replies via the UltraMsg instance REST API.
//!
//! UltraMsg authenticates with a token parameter in the request body rather
//! than a header, and scopes every call to an instance id.

use crate::config::{resolve_ultramsg_instance, resolve_ultramsg_token, Config};
use async_trait::async_trait;
use std::time::Duration;

const DEFAULT_API_BASE: &str = "https://api.ultramsg.com";
const SEND_TIMEOUT: Duration = Duration::from_secs(15);

pub const ULTRAMSG_CHANNEL_ID: &str = "ultramsg";

/// UltraMsg channel connector: sends text replies via POST /{instance}/messages/chat.
pub struct UltraMsgChannel {
    base_url: String,
    instance_id: Option<String>,
    token: Option<String>,
    client: reqwest::Client,
}

impl UltraMsgChannel {
    pub fn new(base_url: Option<String>, instance_id: Option<String>, token: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Self {
            base_url,
            instance_id,
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.channels.ultramsg.base_url.clone(),
            resolve_ultramsg_instance(config),
            resolve_ultramsg_token(config),
        )
    }

    fn credentials(&self) -> Result<(&str, &str), String> {
        let instance = self
            .instance_id
            .as_deref()
            .ok_or("ultramsg instance id not configured")?;
        let token = self.token.as_deref().ok_or("ultramsg token not configured")?;
        Ok((instance, token))
    }
}

#[async_trait]
impl crate::channels::ChannelHandle for UltraMsgChannel {
    fn id(&self) -> &str {
        ULTRAMSG_CHANNEL_ID
    }

    async fn send_text(&self, to: &str, body: &str) -> Result<(), String> {
        let (instance, token) = self.credentials()?;
        let url = format!("{}/{}/messages/chat", self.base_url, instance);
        let res = self
            .client
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .form(&[("token", token), ("to", to), ("body", body)])
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(format!("ultramsg send failed: {} {}", status, body));
        }
        Ok(())
    }
}
