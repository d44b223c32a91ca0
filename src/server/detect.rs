use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{DetectImage, Detection};
use crate::server::error::ApiError;
use crate::server::state::AppState;

pub const ACCEPTED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

#[derive(Debug, Default, Deserialize)]
pub struct DetectQuery {
    #[serde(default)]
    pub return_image: bool,
    /// Overrides the configured confidence threshold for this request.
    pub threshold: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetectResponse {
    pub time_ms: f64,
    pub detections: Vec<Detection>,
    pub image_b64: Option<String>,
}

/// First multipart field called `name`, with its content type.
/// A body cut off by the upload limit surfaces as [`ApiError::PayloadTooLarge`].
pub(crate) async fn read_file_field(multipart: &mut Multipart, name: &str) -> Result<(Option<String>, Option<String>, Vec<u8>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(name) {
            let content_type = field.content_type().map(|c| c.to_string());
            let file_name = field.file_name().map(|f| f.to_string());
            let data = field.bytes().await?;
            return Ok((content_type, file_name, data.to_vec()));
        }
    }
    Err(ApiError::Unprocessable(format!("`{name}` field is required")))
}

fn image_too_large(max_upload_bytes: usize) -> ApiError {
    ApiError::PayloadTooLarge(format!("Image too large (max {} MB)", max_upload_bytes / (1024 * 1024)))
}

pub async fn detect(
    State(state): State<AppState>,
    query: Result<Query<DetectQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectResponse>, ApiError> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    if let Some(threshold) = query.threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ApiError::Unprocessable("threshold must be between 0 and 1".to_string()));
        }
    }

    let (content_type, _, raw) = read_file_field(&mut multipart, "file").await.map_err(|e| match e {
        ApiError::PayloadTooLarge(_) => image_too_large(state.max_upload_bytes),
        other => other,
    })?;
    if !content_type.as_deref().is_some_and(|c| ACCEPTED_IMAGE_TYPES.contains(&c)) {
        return Err(ApiError::UnsupportedMediaType("Send JPEG/PNG/WEBP image".to_string()));
    }
    if raw.len() > state.max_upload_bytes {
        return Err(image_too_large(state.max_upload_bytes));
    }

    let detector = state
        .detector
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("detection model not configured".to_string()))?;

    let image = tokio::task::spawn_blocking(move || DetectImage::decode(&raw))
        .await
        .map_err(|e| anyhow::anyhow!("decoder task failed: {e}"))?
        .map_err(|e| ApiError::BadRequest(format!("Invalid image: {e}")))?
        .with_threshold(query.threshold);

    let outcome = detector.detect(image, query.return_image).await?;
    Ok(Json(DetectResponse {
        time_ms: outcome.elapsed.as_secs_f64() * 1000.0,
        detections: outcome.detections,
        image_b64: outcome.image_b64,
    }))
}
