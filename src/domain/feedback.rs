use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const SCORE_MIN: u8 = 1;
pub const SCORE_MAX: u8 = 10;
pub const STRENGTHS_RANGE: (usize, usize) = (2, 4);
pub const WEAKNESSES_RANGE: (usize, usize) = (2, 4);
pub const TIPS_RANGE: (usize, usize) = (3, 5);

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strength {
    /// What the candidate did well.
    pub point: String,
    /// Direct quote from the candidate demonstrating it.
    pub quote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weakness {
    pub point: String,
    pub quote: String,
    /// What they should have said or done instead.
    pub suggestion: String,
}

/// Structured evaluation of one ended session. Produced exactly once per
/// session by the feedback generator and validated before it is shown;
/// a shape violation rejects the whole object, never a partial render.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub overall_score: u8,
    pub final_offer: String,
    pub target_salary: String,
    pub summary: String,
    pub strengths: Vec<Strength>,
    pub weaknesses: Vec<Weakness>,
    pub tips: Vec<String>,
}

impl Feedback {
    pub fn validate(&self) -> Result<()> {
        if self.overall_score < SCORE_MIN || self.overall_score > SCORE_MAX {
            return Err(AppError::SchemaError(format!(
                "overallScore {} outside [{}, {}]",
                self.overall_score, SCORE_MIN, SCORE_MAX
            )));
        }
        check_len("strengths", self.strengths.len(), STRENGTHS_RANGE)?;
        check_len("weaknesses", self.weaknesses.len(), WEAKNESSES_RANGE)?;
        check_len("tips", self.tips.len(), TIPS_RANGE)?;
        if self.summary.trim().is_empty() {
            return Err(AppError::SchemaError("summary is empty".to_string()));
        }
        Ok(())
    }
}

fn check_len(field: &str, len: usize, (min, max): (usize, usize)) -> Result<()> {
    if len < min || len > max {
        return Err(AppError::SchemaError(format!(
            "{} has {} entries, expected {}-{}",
            field, len, min, max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(score: u8, strengths: usize, weaknesses: usize, tips: usize) -> Feedback {
        Feedback {
            overall_score: score,
            final_offer: "135,000".to_string(),
            target_salary: "150,000".to_string(),
            summary: "Held firm early, conceded late.".to_string(),
            strengths: (0..strengths)
                .map(|i| Strength {
                    point: format!("strength {}", i),
                    quote: "I had a competing offer".to_string(),
                })
                .collect(),
            weaknesses: (0..weaknesses)
                .map(|i| Weakness {
                    point: format!("weakness {}", i),
                    quote: "I guess that's fine".to_string(),
                    suggestion: "Restate your target with data".to_string(),
                })
                .collect(),
            tips: (0..tips).map(|i| format!("tip {}", i)).collect(),
        }
    }

    #[test]
    fn test_in_range_feedback_passes() {
        assert!(sample(7, 2, 2, 3).validate().is_ok());
        assert!(sample(1, 4, 4, 5).validate().is_ok());
        assert!(sample(10, 3, 3, 4).validate().is_ok());
    }

    #[test]
    fn test_score_bounds() {
        assert!(sample(0, 2, 2, 3).validate().is_err());
        assert!(sample(11, 2, 2, 3).validate().is_err());
    }

    #[test]
    fn test_strengths_bounds() {
        assert!(sample(7, 1, 2, 3).validate().is_err());
        assert!(sample(7, 5, 2, 3).validate().is_err());
    }

    #[test]
    fn test_weaknesses_bounds() {
        assert!(sample(7, 2, 1, 3).validate().is_err());
        assert!(sample(7, 2, 5, 3).validate().is_err());
    }

    #[test]
    fn test_tips_bounds() {
        assert!(sample(7, 2, 2, 2).validate().is_err());
        assert!(sample(7, 2, 2, 6).validate().is_err());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample(7, 2, 2, 3)).unwrap();
        assert!(json.get("overallScore").is_some());
        assert!(json.get("finalOffer").is_some());
        assert!(json.get("targetSalary").is_some());
    }
}
