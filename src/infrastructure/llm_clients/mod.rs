pub mod anthropic;
pub mod openai;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::error::Result;
use crate::domain::llm_config::{LLMConfig, LLMProvider};
use crate::domain::turn::Turn;
use anthropic::AnthropicClient;
use openai::OpenAICompatClient;

#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Single-shot completion, used for feedback generation.
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String>;

    /// Role-played chat completion. Fragments are delivered over `tx` in
    /// arrival order; the returned string is the full concatenation and is
    /// authoritative.
    async fn stream_chat(
        &self,
        config: &LLMConfig,
        system: &str,
        history: &[Turn],
        tx: mpsc::Sender<String>,
    ) -> Result<String>;
}

pub struct RouterClient {
    anthropic: AnthropicClient,
    openai: OpenAICompatClient,
}

impl RouterClient {
    pub fn new() -> Self {
        Self {
            anthropic: AnthropicClient::new(),
            openai: OpenAICompatClient::new(),
        }
    }
}

impl Default for RouterClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for RouterClient {
    async fn generate(&self, config: &LLMConfig, system: &str, user: &str) -> Result<String> {
        match config.provider {
            LLMProvider::Anthropic => self.anthropic.generate(config, system, user).await,
            LLMProvider::OpenAICompatible => self.openai.generate(config, system, user).await,
        }
    }

    async fn stream_chat(
        &self,
        config: &LLMConfig,
        system: &str,
        history: &[Turn],
        tx: mpsc::Sender<String>,
    ) -> Result<String> {
        match config.provider {
            LLMProvider::Anthropic => self.anthropic.stream_chat(config, system, history, tx).await,
            LLMProvider::OpenAICompatible => {
                self.openai.stream_chat(config, system, history, tx).await
            }
        }
    }
}
