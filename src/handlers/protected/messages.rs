use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::conversations::{self, Conversation, ThreadMessage};
use crate::state::AppState;

/// GET /api/users/:user_id/conversations - latest message per peer
pub async fn list(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Vec<Conversation>> {
    let result = conversations::conversations(state.store.as_ref(), user_id).await?;
    Ok(ApiResponse::success(result))
}

/// GET /api/users/:user_id/conversations/:peer_id/messages - oldest first
pub async fn history(
    State(state): State<AppState>,
    Path((user_id, peer_id)): Path<(i64, i64)>,
) -> ApiResult<Vec<ThreadMessage>> {
    let thread = conversations::history(state.store.as_ref(), user_id, peer_id).await?;
    Ok(ApiResponse::success(thread))
}

/// POST /api/users/:user_id/conversations/:peer_id/messages - body `{ "text": "..." }`
pub async fn send(
    State(state): State<AppState>,
    Path((user_id, peer_id)): Path<(i64, i64)>,
    Json(payload): Json<Value>,
) -> ApiResult<ThreadMessage> {
    let text = payload.get("text").and_then(Value::as_str);
    let message = conversations::send(state.store.as_ref(), user_id, peer_id, text).await?;
    Ok(ApiResponse::created(message))
}
