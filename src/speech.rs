//! Text-to-speech and speech-to-text backends.
//!
//! Request handlers depend on the [`Synthesizer`] and [`Transcriber`] traits,
//! so the HTTP services behind them can be swapped or faked in tests.

use async_trait::async_trait;
use thiserror::Error;

mod stt;
mod tts;

pub use stt::*;
pub use tts::*;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Text is empty")]
    EmptyText,
    #[error("Audio is empty")]
    EmptyAudio,
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Returns MP3 bytes for `text` spoken in `lang`.
    async fn synthesize(&self, text: &str, lang: &str, slow: bool) -> Result<Vec<u8>, SpeechError>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, req: TranscribeRequest) -> Result<Transcript, SpeechError>;
}

pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SpeechError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(SpeechError::Upstream { status: status.as_u16(), body })
}
