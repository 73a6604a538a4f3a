use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::database::models::PortfolioLinks;
use crate::error::ApiError;
use crate::handlers::parse_body;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::profile::{self, ProfileUpload, ProfileView, UploadedFile};
use crate::state::AppState;

async fn read_upload(mut multipart: Multipart) -> Result<ProfileUpload, ApiError> {
    let mut upload = ProfileUpload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Could not read file: {}", e)))?;
                upload.file = Some(UploadedFile {
                    file_name,
                    mime_type,
                    bytes: bytes.to_vec(),
                });
            }
            "userId" | "githubLink" | "linkedInLink" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid field {}: {}", name, e)))?;
                match name.as_str() {
                    "userId" => upload.user_id = text.trim().parse().ok(),
                    "githubLink" => upload.links.github_link = Some(text),
                    _ => upload.links.linked_in_link = Some(text),
                }
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    Ok(upload)
}

/// POST /api/attachments - multipart `userId`, `githubLink`, `linkedInLink`, `file`
pub async fn upload(State(state): State<AppState>, multipart: Multipart) -> ApiResult<Value> {
    let upload = read_upload(multipart).await?;
    let saved = profile::save_profile(state.store.as_ref(), &state.config.server.upload_dir, upload).await?;
    Ok(ApiResponse::created(json!({
        "message": "Profile updated successfully",
        "attachment": saved.attachment,
        "portfolio": saved.portfolio,
    })))
}

/// GET /api/users/:user_id/profile - resumes and portfolio links
pub async fn get_profile(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<ProfileView> {
    Ok(ApiResponse::success(profile::get_profile(state.store.as_ref(), user_id).await?))
}

/// PUT /api/attachments/portfolio/:id
pub async fn update_portfolio(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<Value>,
) -> ApiResult<Value> {
    let links: PortfolioLinks = parse_body(payload)?;
    profile::update_portfolio(state.store.as_ref(), id, links).await?;
    Ok(ApiResponse::success(json!({ "message": "Portfolio link updated successfully" })))
}

/// DELETE /api/attachments/portfolio/:id
pub async fn delete_portfolio(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    profile::delete_portfolio(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(json!({ "message": "Portfolio link deleted successfully" })))
}

/// DELETE /api/attachments/resume/:id
pub async fn delete_resume(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Value> {
    profile::delete_resume(state.store.as_ref(), id).await?;
    Ok(ApiResponse::success(json!({ "message": "Resume deleted successfully" })))
}
