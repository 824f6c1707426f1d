use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

const CONFIG_FILE: &str = "salaryrep.toml";
const ENV_PREFIX: &str = "SALARYREP_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeadStoreConfig {
    /// PostgREST-style endpoint of the leads table.
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub llm: LLMConfig,
    pub leads: LeadStoreConfig,
}

impl AppConfig {
    /// TOML file first, then `SALARYREP_`-prefixed environment variables
    /// (nested keys separated with `__`, e.g. `SALARYREP_LLM__API_KEY`).
    pub fn load() -> Result<Self> {
        Figment::new()
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {}", e)))
    }
}
