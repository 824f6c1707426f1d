use tokio::sync::mpsc;
use uuid::Uuid;

use crate::application::use_cases::prompt_builder::PromptBuilder;
use crate::domain::error::Result;
use crate::domain::llm_config::LLMConfig;
use crate::domain::scenario::Scenario;
use crate::domain::turn::Turn;
use crate::infrastructure::llm_clients::LLMClient;

/// Fragments buffered between the provider task and the transcript.
const STREAM_BUFFER: usize = 32;

/// Minimum transcript length before a session may end: the synthesized
/// opener plus at least one full exchange.
pub const MIN_TURNS_TO_END: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Idle,
    Sending,
    Error,
}

/// Outcome of a submit call. `Ignored` means the guard rejected it and no
/// request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Replied,
    Ignored,
}

impl SubmitOutcome {
    pub fn is_replied(&self) -> bool {
        matches!(self, SubmitOutcome::Replied)
    }
}

/// A frozen, ended session handed to the feedback boundary.
#[derive(Debug, Clone)]
pub struct EndedSession {
    pub scenario: Scenario,
    pub transcript: Vec<Turn>,
}

/// One practice conversation. Turns are append-only and never reordered;
/// the `status` field enforces at most one counterpart request in flight.
#[derive(Debug)]
pub struct ConversationSession {
    id: Uuid,
    scenario: Scenario,
    turns: Vec<Turn>,
    status: SessionStatus,
}

impl ConversationSession {
    /// Validate and freeze the scenario, seed the transcript with the
    /// synthesized opener at index 0.
    pub fn start(scenario: Scenario) -> Result<Self> {
        scenario.validate()?;
        let opener = Turn::candidate(PromptBuilder::opening_message(&scenario));
        Ok(Self {
            id: Uuid::new_v4(),
            scenario,
            turns: vec![opener],
            status: SessionStatus::Idle,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// In-progress text of the counterpart reply, for typing indicators.
    pub fn streaming_preview(&self) -> Option<&str> {
        if self.status != SessionStatus::Sending {
            return None;
        }
        self.turns
            .last()
            .filter(|turn| turn.speaker == crate::domain::turn::Speaker::Counterpart)
            .map(|turn| turn.text.as_str())
    }

    /// Submit a candidate turn and stream the counterpart reply into the
    /// transcript.
    ///
    /// Guard: blank text or an already-sending session is a no-op that
    /// issues zero requests. Submitting while `Error` is the retry path and
    /// clears the indicator. On failure the candidate turn stays in the
    /// transcript (no rollback) and whatever reply text already streamed in
    /// stays too; the session parks in `Error` until the next submit.
    pub async fn submit(
        &mut self,
        text: &str,
        client: &dyn LLMClient,
        config: &LLMConfig,
    ) -> Result<SubmitOutcome> {
        let text = text.trim();
        if text.is_empty() || self.status == SessionStatus::Sending {
            return Ok(SubmitOutcome::Ignored);
        }

        self.status = SessionStatus::Sending;
        self.turns.push(Turn::candidate(text));

        let system = PromptBuilder::counterpart_system_prompt(&self.scenario);
        let history = self.turns.clone();
        let (tx, mut rx) = mpsc::channel::<String>(STREAM_BUFFER);

        let request = client.stream_chat(config, &system, &history, tx);
        tokio::pin!(request);

        // The reply turn is created on the first fragment and mutated in
        // place until the terminal signal. Draining fragments while the
        // request future runs keeps the channel from backing up.
        let mut reply_index: Option<usize> = None;
        let mut outcome = None;
        loop {
            tokio::select! {
                fragment = rx.recv() => match fragment {
                    Some(fragment) => {
                        let index = *reply_index.get_or_insert_with(|| {
                            self.turns.push(Turn::counterpart(""));
                            self.turns.len() - 1
                        });
                        self.turns[index].text.push_str(&fragment);
                    }
                    None => break,
                },
                result = &mut request, if outcome.is_none() => {
                    outcome = Some(result);
                }
            }
        }

        match outcome {
            Some(Ok(final_text)) => {
                // The returned concatenation is authoritative; it also covers
                // providers that deliver no incremental fragments.
                match reply_index {
                    Some(index) => self.turns[index].text = final_text,
                    None => self.turns.push(Turn::counterpart(final_text)),
                }
                self.status = SessionStatus::Idle;
                Ok(SubmitOutcome::Replied)
            }
            Some(Err(err)) => {
                self.status = SessionStatus::Error;
                Err(err)
            }
            None => {
                // Channel closed without the request resolving; treat as a
                // provider failure.
                self.status = SessionStatus::Error;
                Err(crate::domain::error::AppError::LLMError(
                    "counterpart stream ended unexpectedly".to_string(),
                ))
            }
        }
    }

    pub fn can_end(&self) -> bool {
        self.turns.len() >= MIN_TURNS_TO_END && self.status == SessionStatus::Idle
    }

    /// Freeze the transcript and hand it to the feedback boundary. Rejected
    /// ends return the session untouched.
    pub fn end(self) -> std::result::Result<EndedSession, ConversationSession> {
        if !self.can_end() {
            return Err(self);
        }
        Ok(EndedSession {
            scenario: self.scenario,
            transcript: self.turns,
        })
    }
}
