use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Talent API",
            "version": version,
            "description": "Job platform backend: profiles, applications, skills, messaging and notifications",
            "endpoints": {
                "health": "/health (public)",
                "users": "/api/users[/:user_id] (protected)",
                "applications": "/api/users/:user_id/applied-for, /api/jobs/:job_id/applicants (protected)",
                "messages": "/api/users/:user_id/conversations (protected)",
                "skills": "/api/skills (protected)",
                "attachments": "/api/attachments (protected), /api/attachments/:id/download (public)",
                "notifications": "/api/notifications (protected)",
                "preferences": "/api/preferences (protected)",
            }
        }
    }))
}

/// GET /health - liveness plus a store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
