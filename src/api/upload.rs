//! Image upload endpoint. Files are kept on local disk and served under `/uploads`.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::ApiResult;
use crate::errors::AppError;
use crate::AppState;

/// Largest accepted image, in bytes.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Request body limit for the upload route; leaves room for multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 64 * 1024;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub filename: String,
}

/// POST /api/upload - Store one image from the `file` form field.
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let mut multipart = multipart
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e.body_text())))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let is_image = field
            .content_type()
            .is_some_and(|ct| ct.starts_with("image/"));
        if !is_image {
            return Err(AppError::Validation(
                "Only image files can be uploaded".to_string(),
            ));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await?;
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::PayloadTooLarge(
                "Images are limited to 10 MB".to_string(),
            ));
        }

        let filename = format!(
            "{}_{}",
            Utc::now().timestamp_millis(),
            sanitize_file_name(&original_name)
        );
        let upload_dir = &state.config.upload_dir;
        tokio::fs::create_dir_all(upload_dir).await?;
        tokio::fs::write(upload_dir.join(&filename), &bytes).await?;

        tracing::info!(filename = %filename, size = bytes.len(), "Image uploaded");
        return Ok(Json(UploadResponse {
            success: true,
            url: format!("/uploads/{}", filename),
            filename,
        }));
    }

    Err(AppError::Validation("No file provided".to_string()))
}

/// Replace everything outside `[A-Za-z0-9.-]` with `_`.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("seoul tower.jpg"), "seoul_tower.jpg");
        assert_eq!(sanitize_file_name("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_file_name("경복궁.png"), "___.png");
    }
}
