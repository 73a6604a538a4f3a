use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::database::models::Notification;
use crate::handlers::id_field;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::notifications::{self, Created};
use crate::state::AppState;

/// POST /api/notifications - 201 when stored, 200 with the existing row
/// when the same message was already sent to the receiver
pub async fn create(State(state): State<AppState>, Json(payload): Json<Value>) -> ApiResult<Value> {
    let receiver_id = id_field(&payload, "receiverId");
    let message = payload.get("message").and_then(Value::as_str);

    Ok(match notifications::create(state.store.as_ref(), receiver_id, message).await? {
        Created::New(notification) => ApiResponse::created(json!({ "notification": notification })),
        Created::Existing(notification) => ApiResponse::with_status(
            json!({
                "message": "Notification already exists",
                "notification": notification,
            }),
            StatusCode::OK,
        ),
    })
}

/// GET /api/users/:user_id/notifications - newest first
pub async fn list(State(state): State<AppState>, Path(receiver_id): Path<i64>) -> ApiResult<Vec<Notification>> {
    Ok(ApiResponse::success(notifications::list(state.store.as_ref(), receiver_id).await?))
}

/// PATCH /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Notification> {
    let notification = notifications::mark_read(state.store.as_ref(), id, auth_user.user_id).await?;
    Ok(ApiResponse::success(notification))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(State(state): State<AppState>, Extension(auth_user): Extension<AuthUser>) -> ApiResult<Value> {
    let updated = notifications::mark_all_read(state.store.as_ref(), auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({
        "message": "All notifications marked as read",
        "updated": updated,
    })))
}

/// DELETE /api/notifications/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<Value> {
    notifications::delete(state.store.as_ref(), id, auth_user.user_id).await?;
    Ok(ApiResponse::success(json!({ "message": "Notification deleted" })))
}
