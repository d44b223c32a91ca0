use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use crate::speech::{check_status, SpeechError, Transcriber};

pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";
const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "m4a", "ogg", "webm", "flac", "aac"];

#[derive(Debug, Clone, Default)]
pub struct TranscribeRequest {
    pub audio: Vec<u8>,
    /// Upload name; only its extension is kept.
    pub filename: String,
    /// Language hint such as `"en"` or `"tl"`; auto-detected when `None`.
    pub language: Option<String>,
    /// Translate to English instead of transcribing.
    pub translate: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: Option<String>,
    pub duration: f64,
    pub segments: Vec<Segment>,
}

/// `verbose_json` body of the OpenAI audio API.
#[derive(Debug, Default, Deserialize)]
struct VerboseJson {
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    segments: Vec<Segment>,
}

impl From<VerboseJson> for Transcript {
    fn from(v: VerboseJson) -> Self {
        let segments: Vec<Segment> = v
            .segments
            .into_iter()
            .map(|s| Segment { text: s.text.trim().to_string(), ..s })
            .collect();
        let joined = segments
            .iter()
            .map(|s| s.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let text = if joined.is_empty() { v.text.trim().to_string() } else { joined };
        let duration = v
            .duration
            .unwrap_or_else(|| segments.last().map(|s| s.end).unwrap_or_default());
        Self { text, language: v.language, duration, segments }
    }
}

/// Whisper served behind an OpenAI-compatible `/v1/audio/*` API
/// (faster-whisper-server, whisper.cpp server, OpenAI itself).
#[derive(Debug, Clone)]
pub struct WhisperHttp {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl WhisperHttp {
    pub fn new(client: reqwest::Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn endpoint(&self, translate: bool) -> String {
        let task = if translate { "translations" } else { "transcriptions" };
        format!("{}/v1/audio/{}", self.base_url, task)
    }
}

#[async_trait]
impl Transcriber for WhisperHttp {
    async fn transcribe(&self, req: TranscribeRequest) -> Result<Transcript, SpeechError> {
        if req.audio.is_empty() {
            return Err(SpeechError::EmptyAudio);
        }
        let filename = upload_name(&req.filename);
        let part = Part::bytes(req.audio).file_name(filename);
        let mut form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");
        if let Some(language) = req.language.filter(|l| !l.trim().is_empty()) {
            form = form.text("language", language);
        }

        let mut request = self.client.post(self.endpoint(req.translate)).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let resp = check_status(request.send().await?).await?;
        let body: VerboseJson = resp.json().await?;
        Ok(Transcript::from(body))
    }
}

/// `audio.<ext>` for a known audio extension of `hint`, else `audio.wav`.
pub fn upload_name(hint: &str) -> String {
    let hint = hint.to_lowercase();
    let ext = AUDIO_EXTENSIONS
        .iter()
        .find(|ext| hint.ends_with(&format!(".{ext}")))
        .copied()
        .unwrap_or("wav");
    format!("audio.{ext}")
}
