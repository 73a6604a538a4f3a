use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{NewPreference, Preference, PreferenceUpdate};
use crate::handlers::parse_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::preferences;
use crate::state::AppState;

/// POST /api/preferences
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Preference> {
    let preference: NewPreference = parse_body(payload)?;
    Ok(ApiResponse::created(preferences::create(state.store.as_ref(), preference).await?))
}

/// GET /api/users/:user_id/preferences
pub async fn list(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<Vec<Preference>> {
    Ok(ApiResponse::success(preferences::list(state.store.as_ref(), user_id).await?))
}

/// PUT /api/preferences/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let changes: PreferenceUpdate = parse_body(payload)?;
    preferences::update(state.store.as_ref(), id, changes).await?;
    Ok(ApiResponse::success(json!({ "message": "Preference updated successfully" })))
}

/// DELETE /api/preferences/:id - body `{ "field": "shift" }` clears one column
pub async fn clear_field(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let field = preferences::clear_field(state.store.as_ref(), id, payload.get("field").and_then(Value::as_str)).await?;
    Ok(ApiResponse::success(json!({ "message": format!("{} cleared successfully", field) })))
}
