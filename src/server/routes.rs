//! API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<ServerState>`.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{ModelConfig, SharedConfig};
use crate::engine::analyst::{GameAnalysis, GameAnalyst, GameRequest};
use crate::engine::{analyze, Analysis, AnalysisInput};
use crate::types::EdgeError;

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub config: SharedConfig,
    /// Absent when provider clients could not be built (missing API keys).
    pub analyst: Option<GameAnalyst>,
}

impl ServerState {
    pub fn new(config: SharedConfig, analyst: Option<GameAnalyst>) -> Self {
        Self { config, analyst }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Envelope for every analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResponse<T> {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: T,
}

impl<T> AnalysisResponse<T> {
    fn new(result: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            result,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

impl From<EdgeError> for ApiError {
    fn from(err: EdgeError) -> Self {
        let status = match err {
            EdgeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            EdgeError::DataProvider { .. } => StatusCode::BAD_GATEWAY,
        };
        api_error(status, err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/config
pub async fn get_config(State(state): State<AppState>) -> Json<ModelConfig> {
    let snapshot = state.config.snapshot().await;
    Json(ModelConfig::clone(&snapshot))
}

/// PUT /api/config
pub async fn put_config(
    State(state): State<AppState>,
    Json(config): Json<ModelConfig>,
) -> Result<Json<ModelConfig>, ApiError> {
    match state.config.replace(config.clone()).await {
        Ok(()) => {
            info!("Model config replaced");
            Ok(Json(config))
        }
        Err(e) => {
            warn!(error = %e, "Rejected model config");
            Err(api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))
        }
    }
}

/// POST /api/analyze
pub async fn post_analyze(
    State(state): State<AppState>,
    Json(input): Json<AnalysisInput>,
) -> Json<AnalysisResponse<Analysis>> {
    let cfg = state.config.snapshot().await;
    Json(AnalysisResponse::new(analyze(&input, &cfg)))
}

/// POST /api/games/analyze
pub async fn post_analyze_game(
    State(state): State<AppState>,
    Json(req): Json<GameRequest>,
) -> Result<Json<AnalysisResponse<GameAnalysis>>, ApiError> {
    let analyst = state.analyst.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Data providers are not configured",
        )
    })?;
    let result = analyst.analyze_game(&req).await?;
    Ok(Json(AnalysisResponse::new(result)))
}
