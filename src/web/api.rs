//! REST API handlers

use crate::diagnostics::{self, HealthStatus};
use crate::engine::{AnswerEngine, Snapshot, GREETING};
use crate::kb::{self, KbSource};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Instant;
use tracing::{error, info};

/// Shared application state.
///
/// The snapshot is read by cloning the inner `Arc` out of the lock; a reload
/// builds a fresh snapshot and swaps the `Arc`, so in-flight queries keep the
/// view they started with.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<RwLock<Arc<Snapshot>>>,
    pub engine: Arc<AnswerEngine>,
    pub source: Option<Arc<KbSource>>,
}

impl AppState {
    fn current_snapshot(&self) -> Result<Arc<Snapshot>, (StatusCode, String)> {
        self.snapshot
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to read snapshot: {}", e),
                )
            })
    }
}

/// Chat request body
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

/// Chat response body
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub strategy: String,
    pub score: f32,
    pub elapsed_ms: f64,
}

/// Greeting response
#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub response: &'static str,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_secs: u64,
    pub uptime_human: String,
}

/// Stats response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub entries: usize,
    pub semantic_available: bool,
    pub embedding_dim: Option<usize>,
    pub degraded: bool,
    pub generated_at: String,
}

/// Reload response
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub entries: usize,
    pub elapsed_ms: f64,
}

/// Handle chat requests: the single client-facing matching endpoint.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let start = Instant::now();

    let snapshot = state.current_snapshot()?;
    let result = state.engine.answer(&snapshot, &request.message);

    Ok(Json(ChatResponse {
        response: result.answer,
        strategy: format!("{:?}", result.strategy).to_lowercase(),
        score: result.score,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }))
}

/// Constant greeting for initial display; never touches the knowledge base.
pub async fn default_message_handler() -> Json<GreetingResponse> {
    Json(GreetingResponse { response: GREETING })
}

/// Handle health check requests
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, String)> {
    let snapshot = state.current_snapshot()?;
    let status = if snapshot.degraded {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    };

    let uptime = diagnostics::get_uptime_secs();
    Ok(Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: uptime,
        uptime_human: diagnostics::format_uptime(uptime),
    }))
}

/// Handle stats requests
pub async fn stats_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, (StatusCode, String)> {
    let snapshot = state.current_snapshot()?;

    Ok(Json(StatsResponse {
        entries: snapshot.kb.len(),
        semantic_available: snapshot.semantic.is_some(),
        embedding_dim: snapshot.semantic.as_ref().map(|s| s.embedding_dim()),
        degraded: snapshot.degraded,
        generated_at: diagnostics::get_timestamp(),
    }))
}

/// Rebuild the snapshot from the configured source and swap it in.
///
/// On failure the previous snapshot keeps serving.
pub async fn reload_handler(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    let start = Instant::now();

    let Some(source) = state.source.clone() else {
        return Err((
            StatusCode::CONFLICT,
            "No knowledge source configured".to_string(),
        ));
    };

    // Source loading may block on file, network, or database I/O
    let loaded = tokio::task::spawn_blocking(move || kb::load(&source))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Reload task failed: {}", e),
            )
        })?;

    let kb = match loaded {
        Ok(kb) => kb,
        Err(e) => {
            error!(error = %e, "Knowledge reload failed; keeping previous snapshot");
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                format!("Reload failed: {}", e),
            ));
        }
    };

    let entries = kb.len();
    let fresh = Arc::new(Snapshot::build(kb, false));

    let mut guard = state.snapshot.write().map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to swap snapshot: {}", e),
        )
    })?;
    *guard = fresh;
    drop(guard);

    info!(entries, "Knowledge base reloaded");

    Ok(Json(ReloadResponse {
        entries,
        elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
    }))
}
