use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::accounts::{AccountError, TokenError};
use crate::detection_runners::DetectError;
use crate::speech::SpeechError;

/// Error returned by every handler; rendered as `{"detail": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    UnsupportedMediaType(String),
    #[error("{0}")]
    Unprocessable(String),
    #[error("{0}")]
    BadGateway(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Keeps the status of an extractor failure, with its text as the detail.
    fn from_rejection(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge(detail),
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ApiError::UnsupportedMediaType(detail),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::Unprocessable(detail),
            s if s.is_server_error() => ApiError::Internal(anyhow::anyhow!(detail)),
            _ => ApiError::BadRequest(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {err:#}");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::AlreadyExists => ApiError::Conflict(err.to_string()),
            AccountError::NotFound => ApiError::Unauthorized(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Key => ApiError::Internal(anyhow::anyhow!(err)),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Busy | DetectError::Stopped => ApiError::ServiceUnavailable(err.to_string()),
            DetectError::Failed(e) => ApiError::Internal(e),
        }
    }
}

impl From<SpeechError> for ApiError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::EmptyText | SpeechError::EmptyAudio => ApiError::BadRequest(err.to_string()),
            SpeechError::Upstream { .. } | SpeechError::Http(_) => {
                tracing::warn!("Speech backend failed: {err}");
                ApiError::BadGateway("speech backend unavailable".to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::from_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::from_rejection(err.status(), err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_variants() {
        assert_eq!(ApiError::from(AccountError::AlreadyExists).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(TokenError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(DetectError::Busy).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ApiError::from(SpeechError::EmptyText).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(anyhow::anyhow!("boom")).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn extractor_failures_keep_their_status() {
        let too_big = ApiError::from_rejection(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".to_string());
        assert!(matches!(too_big, ApiError::PayloadTooLarge(_)));
        let missing = ApiError::from_rejection(StatusCode::UNPROCESSABLE_ENTITY, "missing field".to_string());
        assert_eq!(missing.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let garbled = ApiError::from_rejection(StatusCode::BAD_REQUEST, "invalid float literal".to_string());
        assert_eq!(garbled.to_string(), "invalid float literal");
    }
}
