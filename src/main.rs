use std::sync::{Arc, Mutex};

use actix_web::web;
use tracing::{error, info};

use salaryrep::application::use_cases::feedback_service::FeedbackUseCase;
use salaryrep::application::use_cases::lead_capture::LeadCaptureUseCase;
use salaryrep::infrastructure::config::AppConfig;
use salaryrep::infrastructure::lead_store::RestLeadStore;
use salaryrep::infrastructure::llm_clients::{LLMClient, RouterClient};
use salaryrep::interfaces::http::{add_log, start_server, HttpState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let logs = Arc::new(Mutex::new(Vec::new()));
    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(RouterClient::new());
    let lead_store = Arc::new(RestLeadStore::new(
        config.leads.endpoint.clone(),
        config.leads.api_key.clone(),
    ));

    let state = web::Data::new(HttpState {
        llm_client: llm_client.clone(),
        llm_config: config.llm.clone(),
        feedback_use_case: FeedbackUseCase::new(llm_client.clone()),
        lead_use_case: LeadCaptureUseCase::new(lead_store),
        logs: logs.clone(),
    });

    let server = start_server(&config.http, state)?;
    info!(host = %config.http.host, port = config.http.port, "HTTP server started");
    add_log(
        &logs,
        "INFO",
        "System",
        &format!(
            "Backend initialized and HTTP server started on :{}",
            config.http.port
        ),
    );

    server.await
}
