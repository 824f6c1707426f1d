use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Candidate,
    Counterpart,
}

/// One message in a conversation transcript. Text may be empty while the
/// counterpart reply is still streaming; renderers skip empty turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    #[serde(rename = "role")]
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn candidate(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Candidate,
            text: text.into(),
        }
    }

    pub fn counterpart(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Counterpart,
            text: text.into(),
        }
    }

    pub fn is_renderable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
