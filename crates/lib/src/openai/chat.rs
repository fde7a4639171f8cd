//! Chat completion client: turns the customer's message into the bot's reply.
//!
//! Every call carries the fixed order-taking persona as the system message;
//! the reply is never allowed to be empty, since it becomes the WhatsApp
//! message sent back to the customer.

use crate::config::{resolve_openai_api_key, Config};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

/// The assistant persona. The bot takes restaurant orders over WhatsApp and
/// nothing else; customers mostly write Moroccan Darija.
const ORDER_AGENT_PERSONA: &str = "\
You are the order-taking assistant of a restaurant, answering customers on WhatsApp.
Take food orders, answer menu and price questions briefly, and confirm each order back to the customer before closing.
When information is missing, ask for it: delivery address, phone number, quantities.
Keep replies short and friendly. Answer in the customer's own language (Darija, Arabic, French or English).
Politely decline any topic unrelated to the restaurant or the order.";

/// Client for the OpenAI chat completions API.
#[derive(Clone)]
pub struct ChatClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    client: reqwest::Client,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("openai api key not configured")]
    MissingApiKey,
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat api error: {0}")]
    Api(String),
    #[error("chat reply was empty")]
    Empty,
}

impl ChatClient {
    pub fn new(base_url: Option<String>, api_key: Option<String>, model: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.openai.base_url.clone(),
            resolve_openai_api_key(config),
            config.openai.chat_model.clone(),
        )
    }

    /// POST /v1/chat/completions — one system + user exchange, non-streaming.
    /// Returns the trimmed assistant reply; an empty reply is an error.
    pub async fn reply(&self, user_text: &str) -> Result<String, ChatError> {
        let api_key = self.api_key.as_ref().ok_or(ChatError::MissingApiKey)?;
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_text.to_string(),
                },
            ],
        };
        let res = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .timeout(CHAT_TIMEOUT)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ChatError::Api(format!("{} {}", status, body)));
        }
        let data: ChatResponse = res.json().await?;
        let content = data
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or("")
            .trim()
            .to_string();
        if content.is_empty() {
            return Err(ChatError::Empty);
        }
        Ok(content)
    }
}

/// System message: current local date + persona, so the model knows "today"
/// for opening-hours style questions.
fn system_prompt() -> String {
    let today = chrono::Local::now().format("%Y-%m-%d");
    format!("Today's date: {}\n\n{}", today, ORDER_AGENT_PERSONA)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_is_an_error() {
        let client = ChatClient::new(None, None, None);
        match client.reply("سلام").await {
            Err(ChatError::MissingApiKey) => {}
            other => panic!("expected MissingApiKey, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn system_prompt_carries_date_and_persona() {
        let prompt = system_prompt();
        assert!(prompt.starts_with("Today's date: "));
        assert!(prompt.contains("order-taking assistant"));
    }

    #[test]
    fn chat_response_deserializes() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "واخا، شنو الطلب؟" }, "finish_reason": "stop" }]
        }"#;
        let res: ChatResponse = serde_json::from_str(json).expect("parse");
        assert_eq!(
            res.choices[0].message.content.as_deref(),
            Some("واخا، شنو الطلب؟")
        );
    }

    #[test]
    fn chat_response_tolerates_missing_content() {
        let json = r#"{ "choices": [{ "message": { "role": "assistant" } }] }"#;
        let res: ChatResponse = serde_json::from_str(json).expect("parse");
        assert!(res.choices[0].message.content.is_none());
    }
}
