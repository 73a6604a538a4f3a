use axum::{
    body::Body,
    extract::{Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderValue, Request,
    },
    response::Response,
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::ApiError;
use crate::services::profile;
use crate::state::AppState;

/// Quoted-string safe version of the original upload name
fn disposition_name(file_name: &str) -> String {
    let cleaned: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    if cleaned.trim().is_empty() {
        "download".to_string()
    } else {
        cleaned
    }
}

/// `attachment` disposition with an ASCII `filename` and, when the name
/// does not survive that, an RFC 5987 `filename*` carrying the UTF-8 name
fn disposition_header(file_name: &str) -> String {
    let fallback = disposition_name(file_name);
    if fallback == file_name {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(file_name)
        )
    }
}

/// GET /api/attachments/:id/download - stream the stored file under its
/// original name
pub async fn download(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, ApiError> {
    let (attachment, path) = profile::resolve_download(state.store.as_ref(), &state.config.server.upload_dir, id).await?;

    let response = match ServeFile::new(&path).oneshot(Request::new(Body::empty())).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let (mut parts, body) = response.into_parts();

    if parts.status.is_success() {
        let content_type = HeaderValue::from_str(&attachment.mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        parts.headers.insert(CONTENT_TYPE, content_type);

        let disposition = disposition_header(&attachment.file_name);
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            parts.headers.insert(CONTENT_DISPOSITION, value);
        }
    } else {
        tracing::warn!("Attachment {} could not be served: {}", attachment.id, parts.status);
    }

    Ok(Response::from_parts(parts, Body::new(body)))
}
