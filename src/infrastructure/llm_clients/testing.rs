//! Stub clients for state-machine and boundary tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::LLMClient;
use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::domain::turn::Turn;

enum Step {
    Reply(Vec<String>),
    Fail(String),
}

/// Plays back a fixed script, one step per call, and counts every call so
/// tests can assert how many requests were actually issued.
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    always_fail: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    /// One whole reply per call.
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: Mutex::new(
                replies
                    .into_iter()
                    .map(|reply| Step::Reply(vec![reply.into()]))
                    .collect(),
            ),
            always_fail: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A single reply delivered as several stream fragments.
    pub fn fragments<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: Mutex::new(VecDeque::from([Step::Reply(
                parts.into_iter().map(Into::into).collect(),
            )])),
            always_fail: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            steps: Mutex::new(VecDeque::new()),
            always_fail: Some(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_once_then_reply(reply: &str) -> Self {
        Self {
            steps: Mutex::new(VecDeque::from([
                Step::Fail("scripted failure".to_string()),
                Step::Reply(vec![reply.to_string()]),
            ])),
            always_fail: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        if let Some(message) = &self.always_fail {
            return Step::Fail(message.clone());
        }
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Step::Fail("script exhausted".to_string()))
    }
}

#[async_trait]
impl LLMClient for ScriptedClient {
    async fn generate(&self, _config: &LLMConfig, _system: &str, _user: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Step::Reply(fragments) => Ok(fragments.concat()),
            Step::Fail(message) => Err(AppError::LLMError(message)),
        }
    }

    async fn stream_chat(
        &self,
        _config: &LLMConfig,
        _system: &str,
        _history: &[Turn],
        tx: mpsc::Sender<String>,
    ) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            Step::Reply(fragments) => {
                for fragment in &fragments {
                    let _ = tx.send(fragment.clone()).await;
                }
                Ok(fragments.concat())
            }
            Step::Fail(message) => Err(AppError::LLMError(message)),
        }
    }
}

/// Models the counterpart contract the real provider is instructed to
/// follow: the first reply extends an offer 15% below the target salary
/// parsed from the system prompt, later replies push back.
pub struct ModeledCounterpart {
    calls: AtomicUsize,
}

impl ModeledCounterpart {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    /// First dollar amount mentioned in a reply, commas stripped.
    pub fn offer_in(text: &str) -> Option<u64> {
        let start = text.find('$')? + 1;
        let digits: String = text[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    fn target_from_system(system: &str) -> Option<u64> {
        let start = system.find("target salary: $")? + "target salary: $".len();
        let digits: String = system[start..]
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == ',')
            .filter(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }

    fn format_thousands(value: u64) -> String {
        let digits = value.to_string();
        let mut out = String::new();
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

impl Default for ModeledCounterpart {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for ModeledCounterpart {
    async fn generate(&self, _config: &LLMConfig, _system: &str, _user: &str) -> Result<String> {
        Err(AppError::LLMError(
            "the modeled counterpart only streams".to_string(),
        ))
    }

    async fn stream_chat(
        &self,
        _config: &LLMConfig,
        system: &str,
        _history: &[Turn],
        tx: mpsc::Sender<String>,
    ) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = if call == 0 {
            let target = Self::target_from_system(system).unwrap_or(100_000);
            let offer = target * 85 / 100;
            format!(
                "Thanks for coming in. We're excited to offer you ${}. We think that's a strong package for this level.",
                Self::format_thousands(offer)
            )
        } else {
            "I hear you, but that's above what we've budgeted for this level.".to_string()
        };
        let _ = tx.send(reply.clone()).await;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_parsing() {
        assert_eq!(
            ModeledCounterpart::offer_in("We're excited to offer you $127,500. Welcome!"),
            Some(127_500)
        );
        assert_eq!(ModeledCounterpart::offer_in("No numbers here"), None);
    }

    #[test]
    fn test_thousands_formatting() {
        assert_eq!(ModeledCounterpart::format_thousands(127_500), "127,500");
        assert_eq!(ModeledCounterpart::format_thousands(950), "950");
        assert_eq!(ModeledCounterpart::format_thousands(1_000_000), "1,000,000");
    }
}
