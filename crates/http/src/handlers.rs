use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use datalens_core::{AskRequest, AskResponse, Source, Turn};
use datalens_service::GatewayStats;
use serde::{Deserialize, Serialize};

use crate::api_error::ApiError;
use crate::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if req.message.trim().is_empty() {
        return Err(ApiError::BadRequest("message must not be empty".to_owned()));
    }
    let response = state.chat.ask(&req).await?;
    Ok(Json(response))
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Json<HistoryResponse> {
    let turns = state.chat.history(&session_id).await;
    Json(HistoryResponse { session_id, turns })
}

pub async fn clear_history(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.chat.clear_session(&session_id).await {
        Ok(Json(serde_json::json!({
            "message": format!("Conversation history cleared for session {session_id}")
        })))
    } else {
        Err(ApiError::NotFound(format!("no session {session_id}")))
    }
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub stats: GatewayStats,
}

pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse { status: "operational", stats: state.chat.stats().await })
}

#[derive(Deserialize)]
pub struct SuggestQuery {
    pub q: String,
    pub source: Source,
    #[serde(default = "default_suggest_limit")]
    pub limit: usize,
}

const fn default_suggest_limit() -> usize {
    5
}

#[derive(Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<String>,
}

pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestQuery>,
) -> Json<SuggestResponse> {
    let suggestions = state.chat.suggest(&query.q, query.source, query.limit).await;
    Json(SuggestResponse { suggestions })
}
