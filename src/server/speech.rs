use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::server::detect::read_file_field;
use crate::server::error::ApiError;
use crate::server::state::AppState;
use crate::speech::{TranscribeRequest, Transcript};

#[derive(Debug, Deserialize)]
pub struct TtsReq {
    pub text: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub slow: bool,
}

fn default_lang() -> String {
    "en".to_string()
}

pub async fn tts(State(state): State<AppState>, req: Result<Json<TtsReq>, JsonRejection>) -> Result<Response, ApiError> {
    let Json(req) = req?;
    let tts = state
        .tts
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("text-to-speech not configured".to_string()))?;
    let mp3 = tts.synthesize(&req.text, &req.lang, req.slow).await?;
    Ok(([(CONTENT_TYPE, "audio/mpeg")], mp3).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct SttQuery {
    pub language: Option<String>,
    #[serde(default)]
    pub translate: bool,
}

pub async fn stt(
    State(state): State<AppState>,
    query: Result<Query<SttQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Transcript>, ApiError> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    let stt = state
        .stt
        .clone()
        .ok_or_else(|| ApiError::ServiceUnavailable("speech-to-text not configured".to_string()))?;
    let (_, file_name, audio) = read_file_field(&mut multipart, "file").await?;
    let req = TranscribeRequest {
        audio,
        filename: file_name.unwrap_or_default(),
        language: query.language,
        translate: query.translate,
    };
    Ok(Json(stt.transcribe(req).await?))
}
