use async_trait::async_trait;
use crate::speech::{check_status, SpeechError, Synthesizer};

pub const DEFAULT_TTS_URL: &str = "https://translate.google.com/translate_tts";
/// Longest text the translate endpoint accepts per request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Google Translate's public TTS endpoint, the one `gTTS` talks to.
#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: reqwest::Client,
    url: String,
}

impl GoogleTts {
    pub fn new(client: reqwest::Client, url: &str) -> Self {
        Self { client, url: url.to_string() }
    }
}

#[async_trait]
impl Synthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, lang: &str, slow: bool) -> Result<Vec<u8>, SpeechError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let speed = if slow { "0.24" } else { "1" };
        let total = chunks.len().to_string();

        let mut mp3 = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let idx = idx.to_string();
            let len = chunk.chars().count().to_string();
            let resp = self
                .client
                .get(&self.url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", lang),
                    ("ttsspeed", speed),
                    ("q", chunk.as_str()),
                    ("idx", idx.as_str()),
                    ("total", total.as_str()),
                    ("textlen", len.as_str()),
                ])
                .send()
                .await?;
            let bytes = check_status(resp).await?.bytes().await?;
            mp3.extend_from_slice(&bytes);
        }
        log::debug!("Synthesized {} chunk(s), {} bytes", chunks.len(), mp3.len());
        Ok(mp3)
    }
}

/// Splits `text` on whitespace into chunks of at most `max_chars` characters.
/// Words longer than `max_chars` are cut.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        let extra = if current.is_empty() { word.len() } else { word.len() + 1 };
        if current_len + extra > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.extend(word.iter());
        current_len += word.len();
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
