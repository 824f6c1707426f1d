use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::error::{AppError, Result};

/// Remote lead storage. Upsert is idempotent and keyed by email: submitting
/// the same email again overwrites the stored name.
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn upsert(&self, name: &str, email: &str) -> Result<()>;
}

/// PostgREST-style lead table. The merge-duplicates preference turns the
/// insert into an upsert on the email key.
pub struct RestLeadStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl RestLeadStore {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }
}

#[async_trait]
impl LeadStore for RestLeadStore {
    async fn upsert(&self, name: &str, email: &str) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(AppError::StorageError(
                "Lead endpoint is not configured".to_string(),
            ));
        }

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Prefer", "resolution=merge-duplicates")
            .json(&json!([{ "name": name, "email": email }]));

        if let Some(api_key) = &self.api_key {
            request = request.header("apikey", api_key).bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::StorageError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::StorageError(format!(
                "Lead API error ({}): {}",
                status, text
            )));
        }

        info!(email, "Lead upserted");
        Ok(())
    }
}
