use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::domain::error::{AppError, Result};
use crate::infrastructure::lead_store::LeadStore;

/// Lead form payload. Validation runs before any network call; a failing
/// request never reaches the store.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeadCaptureRequest {
    #[validate(custom(function = "non_blank"))]
    pub name: String,
    #[validate(custom(function = "email_shape"))]
    pub email: String,
}

impl LeadCaptureRequest {
    /// Trim both fields and lower-case the email, matching the upsert key.
    pub fn normalized(&self) -> (String, String) {
        (
            self.name.trim().to_string(),
            self.email.trim().to_lowercase(),
        )
    }
}

fn non_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn email_shape(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() || !value.contains('@') {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

pub struct LeadCaptureUseCase {
    store: std::sync::Arc<dyn LeadStore>,
}

impl LeadCaptureUseCase {
    pub fn new(store: std::sync::Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    /// Validate, normalize, and upsert. Returns the normalized pair so
    /// callers can record it locally.
    pub async fn execute(&self, request: &LeadCaptureRequest) -> Result<(String, String)> {
        request
            .validate()
            .map_err(|_| AppError::ValidationError("Name and valid email are required".to_string()))?;

        let (name, email) = request.normalized();
        self.store.upsert(&name, &email).await?;
        Ok((name, email))
    }
}
