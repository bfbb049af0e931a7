//! Image upload endpoint

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Serialize;
use tracing::info;

use crate::routes::AppError;
use crate::state::AppState;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// URL prefix the upload directory is served under.
pub const UPLOADS_PREFIX: &str = "uploads";

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/upload-image",
        post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    )
}

/// Response from a successful upload
#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    /// Relative reference to store in `image_path`; served at `/<path>`.
    pub path: String,
}

/// POST /upload-image - Store the multipart `file` field
async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if data.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".into()));
        }

        let filename = stored_name(&original);
        let dest = state.upload_dir.join(&filename);
        tokio::fs::write(&dest, &data).await?;
        info!("Stored upload {} ({} bytes)", dest.display(), data.len());

        return Ok(Json(UploadResponse {
            path: format!("{}/{}", UPLOADS_PREFIX, filename),
            filename,
        }));
    }

    Err(AppError::BadRequest("missing multipart field 'file'".into()))
}

/// Unique, path-safe name for an uploaded file, keeping a readable suffix.
fn stored_name(original: &str) -> String {
    let base = std::path::Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    let prefix = uuid::Uuid::new_v4().simple().to_string();
    if cleaned.is_empty() {
        format!("{}-image", prefix)
    } else {
        format!("{}-{}", prefix, cleaned)
    }
}
