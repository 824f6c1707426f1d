use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Industries offered by the setup step.
pub const INDUSTRIES: [&str; 10] = [
    "Technology",
    "Finance & Banking",
    "Healthcare",
    "Consulting",
    "Marketing & Advertising",
    "Education",
    "Manufacturing",
    "Retail & E-commerce",
    "Legal",
    "Other",
];

pub const COMPANY_SIZES: [&str; 5] = [
    "Startup (1-50)",
    "Small (51-200)",
    "Mid-size (201-1,000)",
    "Large (1,001-10,000)",
    "Enterprise (10,000+)",
];

pub const EXPERIENCE_LEVELS: [&str; 5] = [
    "Entry-level (0-2 years)",
    "Mid-level (3-5 years)",
    "Senior (6-10 years)",
    "Lead / Principal (10+ years)",
    "Executive / C-Suite",
];

// Digits with optional thousands separators, e.g. "150,000". The salary is
// opaque text everywhere else in the core and is never parsed to a number.
static SALARY_SHAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][0-9,]*$").unwrap());

/// Parameters of one practice session. Built by the setup step, then owned
/// read-only by the conversation session; changing it means starting over
/// with a new value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub role: String,
    pub target_salary: String,
    pub industry: String,
    pub company_size: String,
    pub experience: String,
    pub persona: String,
}

impl Scenario {
    /// Check that every field is present and drawn from its catalog. A
    /// session may not start on a scenario that fails this.
    pub fn validate(&self) -> Result<()> {
        if self.role.trim().is_empty() {
            return Err(AppError::ValidationError("Role is required".to_string()));
        }
        if !SALARY_SHAPE.is_match(self.target_salary.trim()) {
            return Err(AppError::ValidationError(
                "Target salary must be digits with optional thousands separators".to_string(),
            ));
        }
        if !INDUSTRIES.contains(&self.industry.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Unknown industry: {}",
                self.industry
            )));
        }
        if !COMPANY_SIZES.contains(&self.company_size.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Unknown company size: {}",
                self.company_size
            )));
        }
        if !EXPERIENCE_LEVELS.contains(&self.experience.as_str()) {
            return Err(AppError::ValidationError(format!(
                "Unknown experience level: {}",
                self.experience
            )));
        }
        if self.persona.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Persona is required".to_string(),
            ));
        }
        Ok(())
    }
}
