pub mod use_cases;

pub use use_cases::conversation::ConversationSession;
pub use use_cases::feedback_service::FeedbackUseCase;
pub use use_cases::lead_capture::LeadCaptureUseCase;
pub use use_cases::prompt_builder::PromptBuilder;
pub use use_cases::router::{View, ViewRouter};
pub use use_cases::session_gate::SessionGate;
