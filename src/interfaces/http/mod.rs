use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tracing::warn;

use crate::application::use_cases::feedback_service::FeedbackUseCase;
use crate::application::use_cases::lead_capture::{LeadCaptureRequest, LeadCaptureUseCase};
use crate::application::use_cases::prompt_builder::PromptBuilder;
use crate::domain::error::AppError;
use crate::domain::llm_config::LLMConfig;
use crate::domain::scenario::Scenario;
use crate::domain::turn::Turn;
use crate::infrastructure::config::HttpConfig;
use crate::infrastructure::llm_clients::LLMClient;

const STREAM_BUFFER: usize = 32;
const LOG_CAP: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub llm_client: Arc<dyn LLMClient + Send + Sync>,
    pub llm_config: LLMConfig,
    pub feedback_use_case: FeedbackUseCase,
    pub lead_use_case: LeadCaptureUseCase,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

/// Body shared by the two generation endpoints: the scenario plus the
/// ordered message history accumulated so far.
#[derive(Deserialize)]
pub struct GenerationRequest {
    pub scenario: Scenario,
    pub messages: Vec<Turn>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct LeadResponse {
    success: bool,
}

enum ChatEvent {
    Fragment(String),
    Done,
    Failed(String),
}

#[post("/chat")]
async fn chat(data: web::Data<HttpState>, req: web::Json<GenerationRequest>) -> impl Responder {
    if let Err(err) = req.scenario.validate() {
        return HttpResponse::BadRequest().json(ErrorBody {
            error: err.to_string(),
        });
    }

    add_log(
        &data.logs,
        "INFO",
        "Chat",
        &format!(
            "Counterpart turn requested (persona={} history={})",
            req.scenario.persona,
            req.messages.len()
        ),
    );

    let system = PromptBuilder::counterpart_system_prompt(&req.scenario);
    let history = req.messages.clone();
    let client = data.llm_client.clone();
    let config = data.llm_config.clone();

    let (event_tx, mut event_rx) = mpsc::channel::<ChatEvent>(STREAM_BUFFER);
    tokio::spawn(async move {
        let (frag_tx, mut frag_rx) = mpsc::channel::<String>(STREAM_BUFFER);
        let request = client.stream_chat(&config, &system, &history, frag_tx);
        tokio::pin!(request);

        let mut outcome = None;
        loop {
            tokio::select! {
                fragment = frag_rx.recv() => match fragment {
                    Some(fragment) => {
                        if event_tx.send(ChatEvent::Fragment(fragment)).await.is_err() {
                            // Client went away; stop driving the provider.
                            return;
                        }
                    }
                    None => break,
                },
                result = &mut request, if outcome.is_none() => outcome = Some(result),
            }
        }

        let terminal = match outcome {
            Some(Ok(_)) => ChatEvent::Done,
            Some(Err(err)) => {
                warn!(error = %err, "Counterpart generation failed");
                ChatEvent::Failed(err.to_string())
            }
            None => ChatEvent::Failed("counterpart stream ended unexpectedly".to_string()),
        };
        let _ = event_tx.send(terminal).await;
    });

    // The first event decides the response: a failure before anything
    // streamed still gets a proper error status.
    match event_rx.recv().await {
        Some(ChatEvent::Failed(message)) => {
            add_log(&data.logs, "ERROR", "Chat", &message);
            HttpResponse::BadGateway().json(ErrorBody { error: message })
        }
        Some(ChatEvent::Done) | None => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(""),
        Some(ChatEvent::Fragment(first)) => {
            let rest = ReceiverStream::new(event_rx).filter_map(|event| match event {
                ChatEvent::Fragment(fragment) => Some(fragment),
                // A failure after streaming started can only truncate.
                ChatEvent::Done | ChatEvent::Failed(_) => None,
            });
            let body = tokio_stream::once(first)
                .chain(rest)
                .map(|fragment| Ok::<_, actix_web::Error>(web::Bytes::from(fragment)));
            HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .streaming(body)
        }
    }
}

#[post("/feedback")]
async fn feedback(data: web::Data<HttpState>, req: web::Json<GenerationRequest>) -> impl Responder {
    if let Err(err) = req.scenario.validate() {
        return HttpResponse::BadRequest().json(ErrorBody {
            error: err.to_string(),
        });
    }

    add_log(
        &data.logs,
        "INFO",
        "Feedback",
        &format!("Evaluating session with {} turns", req.messages.len()),
    );

    match data
        .feedback_use_case
        .execute(&data.llm_config, &req.scenario, &req.messages)
        .await
    {
        Ok(feedback) => HttpResponse::Ok().json(feedback),
        Err(err) => {
            add_log(
                &data.logs,
                "ERROR",
                "Feedback",
                &format!("Feedback generation failed: {}", err),
            );
            HttpResponse::BadGateway().json(ErrorBody {
                error: err.to_string(),
            })
        }
    }
}

#[post("/leads")]
async fn leads(data: web::Data<HttpState>, req: web::Json<LeadCaptureRequest>) -> impl Responder {
    match data.lead_use_case.execute(&req).await {
        Ok((_, email)) => {
            add_log(&data.logs, "INFO", "Leads", &format!("Lead saved: {}", email));
            HttpResponse::Ok().json(LeadResponse { success: true })
        }
        Err(AppError::ValidationError(_)) => HttpResponse::BadRequest().json(ErrorBody {
            error: "Name and valid email are required".to_string(),
        }),
        Err(err) => {
            add_log(
                &data.logs,
                "ERROR",
                "Leads",
                &format!("Lead upsert failed: {}", err),
            );
            HttpResponse::InternalServerError().json(ErrorBody {
                error: "Failed to save lead".to_string(),
            })
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap();
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap();
    logs.push(entry.clone());
    if logs.len() > LOG_CAP {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn start_server(http: &HttpConfig, state: web::Data<HttpState>) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(chat)
                .service(feedback)
                .service(leads)
                .service(get_logs),
        )
    })
    .bind((http.host.clone(), http.port))?
    .run();

    Ok(server)
}
