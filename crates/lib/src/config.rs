//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.wajba/config.json`) and environment.
//! Credentials can always be supplied via env vars; a missing value degrades the
//! dependent operation to a fixed error reply instead of failing startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Messaging gateway settings (UltraMsg, Whapi).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// OpenAI settings (chat, transcription, speech).
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Webhook server bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for the webhook HTTP server (default 8080).
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1"). Deployments behind a reverse proxy
    /// or container network set "0.0.0.0".
    #[serde(default = "default_server_bind")]
    pub bind: String,
}

fn default_server_port() -> u16 {
    8080
}

fn default_server_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_server_port(),
            bind: default_server_bind(),
        }
    }
}

/// Per-gateway config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub ultramsg: UltraMsgConfig,
    #[serde(default)]
    pub whapi: WhapiConfig,
}

/// UltraMsg gateway config. The instance id and token come from the UltraMsg
/// dashboard; both are required to send through this channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UltraMsgConfig {
    /// Instance id (e.g. "instance12345"). Overridden by ULTRAMSG_INSTANCE env.
    pub instance_id: Option<String>,
    /// API token. Overridden by ULTRAMSG_TOKEN env.
    pub token: Option<String>,
    /// API base URL override (default https://api.ultramsg.com). Mainly for tests.
    pub base_url: Option<String>,
}

/// Whapi gateway config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhapiConfig {
    /// Channel API token. Overridden by WHAPI_TOKEN env.
    pub token: Option<String>,
    /// API base URL override (default https://gate.whapi.cloud). Mainly for tests.
    pub base_url: Option<String>,
}

/// OpenAI config: one credential shared by chat, transcription and speech.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiConfig {
    /// API key. Overridden by OPENAI_API_KEY env.
    pub api_key: Option<String>,
    /// API base URL override (default https://api.openai.com). Mainly for tests.
    pub base_url: Option<String>,
    /// Chat model for reply generation (default "gpt-4o-mini").
    pub chat_model: Option<String>,
    /// Transcription model for voice notes (default "whisper-1").
    pub transcribe_model: Option<String>,
    /// Speech model for voice replies (default "tts-1").
    pub speech_model: Option<String>,
    /// Speech voice for voice replies (default "alloy").
    pub speech_voice: Option<String>,
    /// When true, reply to voice notes with a synthesized voice note where the
    /// channel supports it; falls back to text on any failure. Default false.
    #[serde(default)]
    pub voice_replies: bool,
}

fn trimmed_non_empty(s: String) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn env_or_config(env_key: &str, config_value: Option<&String>) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .and_then(trimmed_non_empty)
        .or_else(|| config_value.cloned().and_then(trimmed_non_empty))
}

/// Resolve the OpenAI API key: env OPENAI_API_KEY overrides config.
pub fn resolve_openai_api_key(config: &Config) -> Option<String> {
    env_or_config("OPENAI_API_KEY", config.openai.api_key.as_ref())
}

/// Resolve the UltraMsg instance id: env ULTRAMSG_INSTANCE overrides config.
pub fn resolve_ultramsg_instance(config: &Config) -> Option<String> {
    env_or_config("ULTRAMSG_INSTANCE", config.channels.ultramsg.instance_id.as_ref())
}

/// Resolve the UltraMsg token: env ULTRAMSG_TOKEN overrides config.
pub fn resolve_ultramsg_token(config: &Config) -> Option<String> {
    env_or_config("ULTRAMSG_TOKEN", config.channels.ultramsg.token.as_ref())
}

/// Resolve the Whapi token: env WHAPI_TOKEN overrides config.
pub fn resolve_whapi_token(config: &Config) -> Option<String> {
    env_or_config("WHAPI_TOKEN", config.channels.whapi.token.as_ref())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("WAJBA_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".wajba").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or WAJBA_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_port_and_bind() {
        let s = ServerConfig::default();
        assert_eq!(s.port, 8080);
        assert_eq!(s.bind, "127.0.0.1");
    }

    #[test]
    fn empty_config_json_parses_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(config.server.port, 8080);
        assert!(config.channels.ultramsg.token.is_none());
        assert!(config.channels.whapi.token.is_none());
        assert!(!config.openai.voice_replies);
    }

    #[test]
    fn camel_case_fields_parse() {
        let json = r#"{
            "server": { "port": 9000, "bind": "0.0.0.0" },
            "channels": {
                "ultramsg": { "instanceId": "instance42", "token": "um-token" },
                "whapi": { "token": "wh-token", "baseUrl": "http://127.0.0.1:1" }
            },
            "openai": { "apiKey": "sk-test", "chatModel": "gpt-4o-mini", "voiceReplies": true }
        }"#;
        let config: Config = serde_json::from_str(json).expect("parse config");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.channels.ultramsg.instance_id.as_deref(), Some("instance42"));
        assert_eq!(config.channels.whapi.base_url.as_deref(), Some("http://127.0.0.1:1"));
        assert_eq!(config.openai.api_key.as_deref(), Some("sk-test"));
        assert!(config.openai.voice_replies);
    }

    #[test]
    fn blank_config_values_resolve_to_none() {
        let mut config = Config::default();
        config.channels.whapi.token = Some("   ".to_string());
        assert_eq!(resolve_whapi_token(&config), None);
        config.channels.whapi.token = Some(" wh-token ".to_string());
        assert_eq!(resolve_whapi_token(&config), Some("wh-token".to_string()));
    }

    #[test]
    fn load_config_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join(format!("wajba-config-test-{}.json", uuid::Uuid::new_v4()));
        let (config, used) = load_config(Some(path.clone())).expect("load");
        assert_eq!(used, path);
        assert_eq!(config.server.port, 8080);
    }
}
