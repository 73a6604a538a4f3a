use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::middleware::{ApiResponse, ApiResult};
use crate::services::applications;
use crate::state::AppState;

/// POST /api/users/:user_id/apply - body `{ "jobIds": [...] }`, full overwrite
pub async fn apply(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let applied_for = applications::set_all(state.store.as_ref(), user_id, payload.get("jobIds")).await?;
    Ok(ApiResponse::success(json!({
        "message": "Applied jobs updated successfully",
        "appliedFor": applied_for,
    })))
}

/// GET /api/users/:user_id/applied-for
pub async fn list(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Value> {
    let applied_for = applications::list(state.store.as_ref(), user_id).await?;
    Ok(ApiResponse::success(json!({ "appliedFor": applied_for })))
}

/// GET /api/users/:user_id/applied-for/:job_id
pub async fn entry(State(state): State<AppState>, Path((user_id, job_id)): Path<(i64, String)>) -> ApiResult<Value> {
    let entry = applications::get_entry(state.store.as_ref(), user_id, &job_id).await?;
    Ok(ApiResponse::success(json!({ "appliedFor": entry })))
}

/// PUT /api/users/:user_id/applied-for/:job_id/status - body `{ "status": "..." }`
pub async fn update_status(
    State(state): State<AppState>,
    Path((user_id, job_id)): Path<(i64, String)>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let status = payload.get("status").and_then(Value::as_str);
    let entry = applications::update_status(state.store.as_ref(), user_id, &job_id, status).await?;
    Ok(ApiResponse::success(json!({ "appliedFor": entry })))
}

/// GET /api/jobs/:job_id/applicants
pub async fn applicants(State(state): State<AppState>, Path(job_id): Path<String>) -> ApiResult<Value> {
    let users_applied = applications::applicants(state.store.as_ref(), &job_id).await?;
    Ok(ApiResponse::success(json!({ "usersApplied": users_applied })))
}
