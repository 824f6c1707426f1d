pub mod error;
pub mod feedback;
pub mod llm_config;
pub mod persona;
pub mod scenario;
pub mod turn;
