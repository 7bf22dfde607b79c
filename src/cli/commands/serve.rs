//! HTTP API server for the chatbot.
//!
//! Provides REST endpoints for chat, plain course search, and health.
//! Conversation history travels with each request; the server holds none.

use crate::answer::NOT_AVAILABLE;
use crate::catalog::{CourseRecord, Curriculum};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::CourseBotError;
use crate::history::History;
use crate::orchestrator::Orchestrator;
use crate::retrieval::SearchMatch;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info_span, warn, Instrument};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    super::run_preflight(Operation::Respond, &settings)?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings)?;
    let courses = orchestrator.catalog().len();
    let app = router(Arc::new(AppState { orchestrator }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Coursebot API Server");
    println!();
    Output::success(&format!("Listening on http://{} ({} courses)", addr, courses));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/search", post(search))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

/// Missing fields deserialize as empty so they are rejected with the
/// same structured error as blank ones.
#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
    #[serde(default)]
    history: History,
}

#[derive(Serialize)]
struct ChatResponse {
    answer: String,
    history: History,
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    /// Falls back to `retrieval.search_k`.
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
struct SearchResult {
    rank: usize,
    course_name: String,
    course_link: String,
    course_details: String,
    course_price: String,
    number_of_lessons: String,
    course_description: String,
    /// Topic list or sentinel text, as stored in the catalog.
    course_curriculum: Curriculum,
    distance: f32,
}

impl From<SearchMatch> for SearchResult {
    fn from(m: SearchMatch) -> Self {
        let course = m.course.unwrap_or_else(CourseRecord::default);
        let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Self {
            rank: m.rank,
            course_curriculum: course
                .curriculum
                .unwrap_or_else(|| Curriculum::Unavailable(NOT_AVAILABLE.to_string())),
            course_name: or_na(course.name),
            course_link: or_na(course.link),
            course_details: or_na(course.details),
            course_price: or_na(course.price),
            number_of_lessons: or_na(course.lessons),
            course_description: or_na(course.description),
            distance: m.distance,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: CourseBotError) -> Response {
    let status = if e.is_input_error() {
        StatusCode::BAD_REQUEST
    } else {
        warn!("Request failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: rejection.body_text(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "courses": state.orchestrator.catalog().len(),
        "vectors": state.orchestrator.index().len(),
    }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return rejection_response(rejection),
    };
    let span = info_span!("chat", request_id = %Uuid::new_v4());

    match state
        .orchestrator
        .respond(&req.message, req.history)
        .instrument(span)
        .await
    {
        Ok(reply) => Json(ChatResponse {
            answer: reply.answer,
            history: reply.history,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return rejection_response(rejection),
    };
    let span = info_span!("search", request_id = %Uuid::new_v4());

    match state.orchestrator.search(&req.query, req.k).instrument(span).await {
        Ok(matches) => Json(SearchResponse {
            results: matches.into_iter().map(SearchResult::from).collect(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}
