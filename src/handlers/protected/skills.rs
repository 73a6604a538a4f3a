use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::Skill;
use crate::handlers::id_field;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{matching, skills};
use crate::state::AppState;

/// POST /api/skills - body `{ "userId", "skills": ["Rust" | {name, level, rating}] }`
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Vec<Skill>> {
    let created = skills::create(state.store.as_ref(), id_field(&payload, "userId"), payload.get("skills")).await?;
    Ok(ApiResponse::created(created))
}

/// GET /api/skills
pub async fn list_all(State(state): State<AppState>) -> ApiResult<Vec<Skill>> {
    Ok(ApiResponse::success(skills::list_all(state.store.as_ref()).await?))
}

/// GET /api/users/:user_id/skills
pub async fn for_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Vec<Skill>> {
    Ok(ApiResponse::success(skills::list_for_user(state.store.as_ref(), user_id).await?))
}

/// POST /api/skills/match - body `{ "jobSkills": "a, b" | ["a", "b"] }`
pub async fn match_job(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Value> {
    let matches = matching::match_job_skills(state.store.as_ref(), payload.get("jobSkills")).await?;
    Ok(ApiResponse::success(json!({ "matches": matches })))
}

/// PUT /api/skills/:id - the first element of `skills` replaces the row
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Skill> {
    let updated = skills::update(state.store.as_ref(), id, id_field(&payload, "userId"), payload.get("skills")).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/skills/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    skills::delete(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(json!({ "message": "Skill deleted" })))
}
