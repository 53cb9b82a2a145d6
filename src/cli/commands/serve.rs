//! HTTP API server for integration with other systems.
//!
//! Exposes the orchestrator operations as JSON endpoints.

use super::open_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::probe::Operation;
use crate::vector_store::{SearchHit, VideoRecord};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = open_orchestrator(settings, Operation::Index)?;
    let app = router(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("vidqa API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Add videos", "POST   /videos");
    Output::kv("List videos", "GET    /videos");
    Output::kv("Video chunks", "GET    /videos/{video_id}");
    Output::kv("Remove video", "DELETE /videos/{video_id}");
    Output::kv("Clear", "DELETE /videos");
    Output::kv("Search", "POST   /search");
    Output::kv("Ask", "POST   /ask");
    Output::kv("Stats", "GET    /stats");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(orchestrator: Orchestrator) -> Router {
    let state = Arc::new(AppState { orchestrator });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/videos", get(list_videos).post(add_videos).delete(clear))
        .route("/videos/{video_id}", get(get_video).delete(remove_video))
        .route("/search", post(search))
        .route("/ask", post(ask))
        .route("/stats", get(stats))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AddRequest {
    urls: Vec<String>,
    #[serde(default)]
    force_refresh: bool,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    include_sources: bool,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<Vec<SearchHit>>,
}

#[derive(Serialize)]
struct VideoListResponse {
    videos: Vec<VideoRecord>,
    total: usize,
}

#[derive(Serialize)]
struct VideoDetailResponse {
    video_id: String,
    chunk_count: usize,
    chunks: Vec<ChunkInfo>,
}

#[derive(Serialize)]
struct ChunkInfo {
    chunk_index: usize,
    document: String,
    start_time: Option<f64>,
    end_time: Option<f64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> axum::response::Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn add_videos(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddRequest>,
) -> impl IntoResponse {
    Json(
        state
            .orchestrator
            .add_videos(&req.urls, req.force_refresh)
            .await,
    )
}

async fn list_videos(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let videos = state.orchestrator.list_videos().await;
    Json(VideoListResponse {
        total: videos.len(),
        videos,
    })
}

async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    let chunks = state.orchestrator.video_chunks(&video_id).await;
    if chunks.is_empty() {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Video not found: {}", video_id),
        );
    }

    Json(VideoDetailResponse {
        video_id,
        chunk_count: chunks.len(),
        chunks: chunks
            .into_iter()
            .map(|c| ChunkInfo {
                chunk_index: c.metadata.chunk_index,
                document: c.document,
                start_time: c.metadata.start_time,
                end_time: c.metadata.end_time,
            })
            .collect(),
    })
    .into_response()
}

async fn remove_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    if state.orchestrator.remove_video(&video_id).await {
        Json(serde_json::json!({ "removed": video_id })).into_response()
    } else {
        error_response(
            StatusCode::NOT_FOUND,
            format!("Video not found: {}", video_id),
        )
    }
}

async fn clear(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.orchestrator.clear_knowledge_base().await {
        Json(serde_json::json!({ "cleared": true })).into_response()
    } else {
        error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to clear the knowledge base".to_string(),
        )
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let results = state
        .orchestrator
        .relevant_sources(&req.query, req.top_k)
        .await;
    Json(SearchResponse { results })
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> impl IntoResponse {
    let answer = state
        .orchestrator
        .ask_question(&req.question, req.top_k)
        .await;

    let sources = if req.include_sources {
        Some(
            state
                .orchestrator
                .relevant_sources(&req.question, req.top_k)
                .await,
        )
    } else {
        None
    };

    Json(AskResponse { answer, sources })
}

async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
