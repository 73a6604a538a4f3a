use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::{User, UserRegistration, UserUpdate};
use crate::handlers::parse_body;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::users;
use crate::state::AppState;

/// POST /api/users/register
pub async fn register(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<User> {
    let registration: UserRegistration = parse_body(payload)?;
    let user = users::register(state.store.as_ref(), registration).await?;
    Ok(ApiResponse::created(user))
}

/// GET /api/users/:user_id
pub async fn get(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<User> {
    let user = users::get(state.store.as_ref(), user_id).await?;
    Ok(ApiResponse::success(user))
}

/// PUT /api/users/:user_id - partial update
pub async fn update(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<User> {
    let changes: UserUpdate = parse_body(payload)?;
    let user = users::update(state.store.as_ref(), user_id, changes).await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users - removes the account of the session user
pub async fn delete(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    users::delete(state.store.as_ref(), auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({ "message": "User deleted successfully" })))
}
