//! Channel registry: register and lookup channels by id.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Handle to a configured channel (send text, optionally send voice).
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Channel id (e.g. "ultramsg").
    fn id(&self) -> &str;
    /// Send a text message to a phone id (digits only, no jid suffix).
    async fn send_text(&self, to: &str, body: &str) -> Result<(), String>;
    /// Send a voice note (OGG/Opus bytes). Default returns error; channels
    /// without a media-upload API keep the default and callers fall back to text.
    async fn send_voice(&self, _to: &str, _audio: &[u8]) -> Result<(), String> {
        Err("voice messages not supported on this channel".to_string())
    }
}

/// Registry of channel ids to handles. Shared across the webhook server.
pub struct ChannelRegistry {
    inner: Arc<RwLock<HashMap<String, Arc<dyn ChannelHandle>>>>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn register(&self, handle: Arc<dyn ChannelHandle>) {
        let mut g = self.inner.write().await;
        g.insert(handle.id().to_string(), handle);
    }

    pub async fn get(&self, id: &str) -> Option<Arc<dyn ChannelHandle>> {
        let g = self.inner.read().await;
        g.get(id).cloned()
    }
}
