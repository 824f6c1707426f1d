use tracing::warn;
use validator::Validate;

use crate::application::use_cases::conversation::{
    ConversationSession, EndedSession, SubmitOutcome,
};
use crate::application::use_cases::feedback_service::FeedbackUseCase;
use crate::application::use_cases::lead_capture::{LeadCaptureRequest, LeadCaptureUseCase};
use crate::application::use_cases::session_gate::SessionGate;
use crate::domain::error::{AppError, Result};
use crate::domain::feedback::Feedback;
use crate::domain::llm_config::LLMConfig;
use crate::domain::scenario::Scenario;
use crate::domain::turn::Turn;
use crate::infrastructure::llm_clients::LLMClient;

/// The screen being presented, carrying only the data that screen needs.
/// Scenario and transcript travel inside the variants, so a feedback view
/// without a scenario (or a chat without a session) cannot be represented.
#[derive(Debug)]
pub enum View {
    EmailCapture,
    Setup,
    Chat(ConversationSession),
    LoadingFeedback {
        scenario: Scenario,
        transcript: Vec<Turn>,
    },
    Feedback {
        scenario: Scenario,
        feedback: Feedback,
    },
    FeedbackError {
        scenario: Scenario,
        transcript: Vec<Turn>,
    },
    Upgrade,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::EmailCapture => "email-capture",
            View::Setup => "setup",
            View::Chat(_) => "chat",
            View::LoadingFeedback { .. } => "loading-feedback",
            View::Feedback { .. } => "feedback",
            View::FeedbackError { .. } => "feedback-error",
            View::Upgrade => "upgrade",
        }
    }
}

/// Finite-state controller over the whole session lifecycle. Owns the gate
/// and the current view; every transition method checks the source state and
/// leaves the router untouched when the transition does not apply.
pub struct ViewRouter {
    gate: SessionGate,
    view: View,
}

impl ViewRouter {
    /// Entry point. A missing contact always lands on the email gate, no
    /// matter what else the store holds.
    pub fn launch(gate: SessionGate) -> Self {
        let view = if !gate.contact_captured() {
            View::EmailCapture
        } else if gate.free_limit_reached() {
            View::Upgrade
        } else {
            View::Setup
        };
        Self { gate, view }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    fn setup_or_upgrade(&self) -> View {
        if self.gate.free_limit_reached() {
            View::Upgrade
        } else {
            View::Setup
        }
    }

    /// Validate and store the contact, then unlock the free tier. The remote
    /// upsert is best-effort: a store failure is logged and the local capture
    /// still unlocks. Validation failures keep the gate view and issue no
    /// network call.
    pub async fn capture_contact(
        &mut self,
        request: &LeadCaptureRequest,
        leads: &LeadCaptureUseCase,
    ) -> Result<()> {
        if !matches!(self.view, View::EmailCapture) {
            return Err(AppError::Internal(
                "Contact capture is only available from the email gate".to_string(),
            ));
        }
        request.validate().map_err(|_| {
            AppError::ValidationError("Name and valid email are required".to_string())
        })?;

        let (name, email) = request.normalized();
        if let Err(err) = leads.execute(request).await {
            warn!(error = %err, "Lead upsert failed, continuing with local capture");
        }
        self.gate.record_contact(&name, &email)?;
        self.view = self.setup_or_upgrade();
        Ok(())
    }

    /// Decision point: entering a new chat re-checks the free limit.
    pub fn start_session(&mut self, scenario: Scenario) -> Result<()> {
        if !matches!(self.view, View::Setup) {
            return Err(AppError::Internal(
                "A session can only start from setup".to_string(),
            ));
        }
        if self.gate.free_limit_reached() {
            self.view = View::Upgrade;
            return Ok(());
        }
        let session = ConversationSession::start(scenario)?;
        self.view = View::Chat(session);
        Ok(())
    }

    pub async fn submit_turn(
        &mut self,
        text: &str,
        client: &dyn LLMClient,
        config: &LLMConfig,
    ) -> Result<SubmitOutcome> {
        match &mut self.view {
            View::Chat(session) => session.submit(text, client, config).await,
            _ => Err(AppError::Internal("No active chat".to_string())),
        }
    }

    /// Freeze the transcript and move to the feedback boundary. Too-short
    /// sessions are rejected and the chat stays as it was.
    pub fn end_session(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.view, View::Setup) {
            View::Chat(session) => match session.end() {
                Ok(EndedSession {
                    scenario,
                    transcript,
                }) => {
                    self.view = View::LoadingFeedback {
                        scenario,
                        transcript,
                    };
                    Ok(())
                }
                Err(session) => {
                    self.view = View::Chat(session);
                    Err(AppError::ValidationError(
                        "The session is too short to end".to_string(),
                    ))
                }
            },
            other => {
                self.view = other;
                Err(AppError::Internal("No active chat to end".to_string()))
            }
        }
    }

    /// Drive the single feedback request for the frozen transcript. Success
    /// reaches the feedback view and counts the session, exactly once;
    /// failure (transport or schema alike) parks on the error view with the
    /// transcript intact for retry.
    pub async fn generate_feedback(
        &mut self,
        feedback: &FeedbackUseCase,
        config: &LLMConfig,
    ) -> Result<()> {
        let (scenario, transcript) = match std::mem::replace(&mut self.view, View::Setup) {
            View::LoadingFeedback {
                scenario,
                transcript,
            } => (scenario, transcript),
            other => {
                self.view = other;
                return Err(AppError::Internal(
                    "No session awaiting feedback".to_string(),
                ));
            }
        };

        match feedback.execute(config, &scenario, &transcript).await {
            Ok(result) => {
                self.view = View::Feedback {
                    scenario,
                    feedback: result,
                };
                self.gate.record_completed_session()?;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Feedback generation failed");
                self.view = View::FeedbackError {
                    scenario,
                    transcript,
                };
                Err(err)
            }
        }
    }

    /// Retry the feedback request with the same frozen transcript.
    pub fn retry_feedback(&mut self) -> Result<()> {
        match std::mem::replace(&mut self.view, View::Setup) {
            View::FeedbackError {
                scenario,
                transcript,
            } => {
                self.view = View::LoadingFeedback {
                    scenario,
                    transcript,
                };
                Ok(())
            }
            other => {
                self.view = other;
                Err(AppError::Internal("No failed feedback to retry".to_string()))
            }
        }
    }

    /// Discard the current session or feedback and head back to setup.
    /// Decision point: the free limit is re-checked. Abandoning a chat never
    /// counts toward the limit. There is no path out of the upgrade view here.
    pub fn new_scenario(&mut self) -> Result<()> {
        match self.view {
            View::Setup
            | View::Chat(_)
            | View::Feedback { .. }
            | View::FeedbackError { .. } => {
                self.view = self.setup_or_upgrade();
                Ok(())
            }
            View::Upgrade => Err(AppError::Internal(
                "Free sessions are used up".to_string(),
            )),
            View::EmailCapture | View::LoadingFeedback { .. } => Err(AppError::Internal(
                "Cannot start a new scenario from here".to_string(),
            )),
        }
    }

    /// External paid-upgrade action.
    pub fn apply_upgrade(&mut self) -> Result<()> {
        Err(AppError::Internal(
            "Paid upgrade is not implemented yet".to_string(),
        ))
    }
}
