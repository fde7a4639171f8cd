//! Speech synthesis client: voice replies for customers who sent a voice note.
//! Opus output matches what WhatsApp voice notes use.

use crate::config::{resolve_openai_api_key, Config};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_SPEECH_MODEL: &str = "tts-1";
const DEFAULT_SPEECH_VOICE: &str = "alloy";
const SPEECH_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the OpenAI speech synthesis API.
#[derive(Clone)]
pub struct SpeechClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    voice: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("openai api key not configured")]
    MissingApiKey,
    #[error("speech request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("speech api error: {0}")]
    Api(String),
}

impl SpeechClient {
    pub fn new(
        base_url: Option<String>,
        api_key: Option<String>,
        model: Option<String>,
        voice: Option<String>,
    ) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            voice: voice.unwrap_or_else(|| DEFAULT_SPEECH_VOICE.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai.base_url.clone(),
            resolve_openai_api_key(config),
            config.openai.speech_model.clone(),
            config.openai.speech_voice.clone(),
        )
    }

    /// POST /v1/audio/speech — returns the synthesized audio bytes (Opus).
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechError> {
        let api_key = self.api_key.as_ref().ok_or(SpeechError::MissingApiKey)?;
        let url = format!("{}/v1/audio/speech", self.base_url);
        let body = SpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: self.voice.clone(),
            response_format: "opus".to_string(),
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(SPEECH_TIMEOUT)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SpeechError::Api(format!("{} {}", status, body)));
        }
        Ok(res.bytes().await?.to_vec())
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest {
    model: String,
    input: String,
    voice: String,
    response_format: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_an_error() {
        let client = SpeechClient::new(None, None, None, None);
        match client.synthesize("واخا").await {
            Err(SpeechError::MissingApiKey) => {}
            other => panic!("expected MissingApiKey, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn speech_request_serializes_opus_format() {
        let body = SpeechRequest {
            model: "tts-1".to_string(),
            input: "سلام".to_string(),
            voice: "alloy".to_string(),
            response_format: "opus".to_string(),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["response_format"], "opus");
        assert_eq!(json["voice"], "alloy");
    }
}
