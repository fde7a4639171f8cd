//! Audio transcription client: download a gateway-hosted voice note and turn
//! it into text via the OpenAI transcription endpoint.

use crate::config::{resolve_openai_api_key, Config};
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TRANSCRIBE_MODEL: &str = "whisper-1";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(20);
const TRANSCRIBE_TIMEOUT: Duration = Duration::from_secs(30);

/// WhatsApp voice notes are OGG/Opus; the transcription endpoint infers the
/// container from the uploaded filename.
const VOICE_FILENAME: &str = "voice.ogg";

/// Client for the OpenAI audio transcription API.
#[derive(Clone)]
pub struct TranscribeClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error("openai api key not configured")]
    MissingApiKey,
    #[error("voice download failed: {0}")]
    Download(String),
    #[error("transcription request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("transcription api error: {0}")]
    Api(String),
    #[error("transcription was empty")]
    Empty,
}

impl TranscribeClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_TRANSCRIBE_MODEL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai.base_url.clone(),
            resolve_openai_api_key(config),
            config.openai.transcribe_model.clone(),
        )
    }

    /// Download the voice note from the gateway media URL, then transcribe it.
    pub async fn transcribe_url(&self, media_url: &str) -> Result<String, TranscribeError> {
        let audio = self.download(media_url).await?;
        self.transcribe(audio).await
    }

    /// Single GET with a bounded timeout; any network error or non-2xx status
    /// is a download failure.
    async fn download(&self, media_url: &str) -> Result<Vec<u8>, TranscribeError> {
        let res = self
            .client
            .get(media_url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await
            .map_err(|e| TranscribeError::Download(e.to_string()))?;
        if !res.status().is_success() {
            return Err(TranscribeError::Download(format!(
                "{} from {}",
                res.status(),
                media_url
            )));
        }
        let bytes = res
            .bytes()
            .await
            .map_err(|e| TranscribeError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// POST /v1/audio/transcriptions — multipart upload of the audio bytes.
    /// Returns the trimmed transcript; whitespace-only output is an error.
    pub async fn transcribe(&self, audio: Vec<u8>) -> Result<String, TranscribeError> {
        let api_key = self.api_key.as_ref().ok_or(TranscribeError::MissingApiKey)?;
        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let file_part = multipart::Part::bytes(audio)
            .file_name(VOICE_FILENAME)
            .mime_str("audio/ogg")?;
        let form = multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(TRANSCRIBE_TIMEOUT)
            .multipart(form)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(TranscribeError::Api(format!("{} {}", status, body)));
        }
        let data: TranscriptionResponse = res.json().await?;
        let text = data.text.trim().to_string();
        if text.is_empty() {
            return Err(TranscribeError::Empty);
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_an_error() {
        let client = TranscribeClient::new(None, None, None);
        match client.transcribe(vec![0u8; 16]).await {
            Err(TranscribeError::MissingApiKey) => {}
            other => panic!("expected MissingApiKey, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn transcription_response_deserializes() {
        let res: TranscriptionResponse =
            serde_json::from_str(r#"{"text": " بغيت طاجين ديال الدجاج "}"#).expect("parse");
        assert_eq!(res.text.trim(), "بغيت طاجين ديال الدجاج");
    }

    #[test]
    fn transcription_response_tolerates_missing_text() {
        let res: TranscriptionResponse = serde_json::from_str("{}").expect("parse");
        assert!(res.text.is_empty());
    }
}
