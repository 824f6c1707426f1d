use async_trait::async_trait;
use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;

use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::turn::{Speaker, Turn};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    client: reqwest::Client,
}

impl AnthropicClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn api_key(config: &LLMConfig) -> Result<String> {
        config
            .api_key
            .clone()
            .ok_or_else(|| AppError::LLMError("Missing API key for Anthropic".to_string()))
    }

    fn messages_url(config: &LLMConfig) -> String {
        format!("{}/v1/messages", config.base_url.trim_end_matches('/'))
    }

    fn history_to_messages(history: &[Turn]) -> Vec<serde_json::Value> {
        history
            .iter()
            .filter(|turn| turn.is_renderable())
            .map(|turn| {
                let role = match turn.speaker {
                    Speaker::Candidate => "user",
                    Speaker::Counterpart => "assistant",
                };
                json!({ "role": role, "content": turn.text })
            })
            .collect()
    }

    async fn post(
        &self,
        config: &LLMConfig,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(Self::messages_url(config))
            .header("x-api-key", Self::api_key(config)?)
            .header("anthropic-version", ANTHROPIC_VERSION)
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

impl Default for AnthropicClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for AnthropicClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": config.model,
            "max_tokens": config.max_tokens.unwrap_or(1024),
            "temperature": config.temperature,
            "system": system,
            "messages": [{ "role": "user", "content": user }],
        });

        let json: serde_json::Value = self
            .post(config, &body)
            .await?
            .json()
            .await
            .map_err(|e| AppError::LLMError(format!("Failed to parse JSON: {}", e)))?;

        json["content"][0]["text"]
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
            "max_tokens": config.max_tokens.unwrap_or(1024),
            "temperature": config.temperature,
            "system": system,
            "messages": Self::history_to_messages(history),
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

            // SSE events are newline-delimited; a fragment never spans lines.
            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();

                let Some(payload) = line.strip_prefix("data: ") else {
                    continue;
                };
                let Ok(event) = serde_json::from_str::<serde_json::Value>(payload) else {
                    continue;
                };
                match event["type"].as_str() {
                    Some("content_block_delta") => {
                        if let Some(text) = event["delta"]["text"].as_str() {
                            full.push_str(text);
                            let _ = tx.send(text.to_string()).await;
                        }
                    }
                    Some("error") => {
                        let message = event["error"]["message"]
                            .as_str()
                            .unwrap_or("unknown provider error");
                        return Err(AppError::LLMError(format!("Stream error: {}", message)));
                    }
                    Some("message_stop") => return Ok(full),
                    _ => {}
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
    fn test_messages_url_handles_trailing_slash() {
        let mut config = LLMConfig::default();
        config.base_url = "https://api.anthropic.com".to_string();
        assert_eq!(
            AnthropicClient::messages_url(&config),
            "https://api.anthropic.com/v1/messages"
        );
        config.base_url = "https://api.anthropic.com/".to_string();
        assert_eq!(
            AnthropicClient::messages_url(&config),
            "https://api.anthropic.com/v1/messages"
        );
    }

    #[test]
    fn test_history_mapping_skips_empty_turns() {
        let history = vec![
            Turn::candidate("Hi"),
            Turn::counterpart(""),
            Turn::counterpart("We're excited to offer you..."),
        ];
        let messages = AnthropicClient::history_to_messages(&history);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[1]["role"], "assistant");
    }

    #[test]
    fn test_missing_api_key_is_an_llm_error() {
        let config = LLMConfig::default();
        assert!(matches!(
            AnthropicClient::api_key(&config),
            Err(AppError::LLMError(_))
        ));
    }
}
