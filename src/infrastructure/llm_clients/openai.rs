use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;

use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::turn::{Speaker, Turn};

/// Client for OpenAI-compatible chat-completions endpoints (OpenRouter,
/// LM Studio, vLLM and friends).
pub struct OpenAICompatClient {
    client: reqwest::Client,
}

impl OpenAICompatClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::LLMError("Missing API key for provider".to_string()))
    }

    fn chat_url(config: &LLMConfig) -> String {
        if config.base_url.ends_with('/') {
            format!("{}chat/completions", config.base_url)
        } else {
            format!("{}/chat/completions", config.base_url)
        }
    }

    fn chat_messages(system: &str, history: &[Turn]) -> Vec<serde_json::Value> {
        let mut messages = vec![json!({ "role": "system", "content": system })];
        messages.extend(history.iter().filter(|turn| turn.is_renderable()).map(
            |turn| {
                let role = match turn.speaker {
                    Speaker::Candidate => "user",
                    Speaker::Counterpart => "assistant",
                };
                json!({ "role": role, "content": turn.text })
            },
        ));
        messages
    }

    async fn post(
        &self,
        config: &LLMConfig,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(Self::chat_url(config))
            .bearer_auth(Self::api_key(config)?)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::LLMError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMError(format!(
                "API error ({}): {}",
                status, text
            )));
        }
        Ok(response)
    }
}

impl Default for OpenAICompatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for OpenAICompatClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": config.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
        });

        let json: serde_json::Value = self
            .post(config, &body)
            .await?
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AppError::LLMError("Invalid response format".to_string()))
    }

    async fn stream_chat(
        &self,
        config: &LLMConfig,
        system: &str,
        history: &[Turn],
        tx: mpsc::Sender<String>,
    ) -> Result<String> {
        let body = json!({
            "model": config.model,
            "messages": Self::chat_messages(system, history),
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "stream": true,
        });

        let response = self.post(config, &body).await?;

        let mut full = String::new();
        let mut buffer: Vec<u8> = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk =
                chunk.map_err(|e| AppError::LLMError(format!("Stream read failed: {}", e)))?;
            buffer.extend_from_slice(&chunk);

            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();

                let Some(payload) = line.strip_prefix("data: ") else {
                    continue;
                };
                if payload == "[DONE]" {
                    return Ok(full);
                }
                let Ok(event) = serde_json::from_str::<serde_json::Value>(payload) else {
                    continue;
                };
                if let Some(text) = event["choices"][0]["delta"]["content"].as_str() {
                    full.push_str(text);
                    let _ = tx.send(text.to_string()).await;
                }
            }
        }

        Ok(full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_url_handles_trailing_slash() {
        let mut config = LLMConfig::default();
        config.base_url = "https://openrouter.ai/api/v1".to_string();
        assert_eq!(
            OpenAICompatClient::chat_url(&config),
            "https://openrouter.ai/api/v1/chat/completions"
        );
        config.base_url = "https://openrouter.ai/api/v1/".to_string();
        assert_eq!(
            OpenAICompatClient::chat_url(&config),
            "https://openrouter.ai/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_chat_messages_lead_with_system() {
        let history = vec![Turn::candidate("Hi"), Turn::counterpart("Hello")];
        let messages = OpenAICompatClient::chat_messages("be a recruiter", &history);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[2]["role"], "assistant");
    }
}
