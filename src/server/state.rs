use std::sync::Arc;

use crate::accounts::{AccountStore, TokenIssuer};
use crate::detection_runners::DetectorHandle;
use crate::server::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::speech::{Synthesizer, Transcriber};

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountStore>,
    /// Present when auth routes are enabled.
    pub tokens: Option<TokenIssuer>,
    pub detector: Option<DetectorHandle>,
    pub tts: Option<Arc<dyn Synthesizer>>,
    pub stt: Option<Arc<dyn Transcriber>>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(accounts: Arc<AccountStore>) -> Self {
        Self {
            accounts,
            tokens: None,
            detector: None,
            tts: None,
            stt: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_tokens(mut self, tokens: TokenIssuer) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_detector(mut self, detector: DetectorHandle) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_tts(mut self, tts: Arc<dyn Synthesizer>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn with_stt(mut self, stt: Arc<dyn Transcriber>) -> Self {
        self.stt = Some(stt);
        self
    }

    pub fn with_max_upload_bytes(mut self, n: usize) -> Self {
        self.max_upload_bytes = n;
        self
    }

    pub fn auth_enabled(&self) -> bool {
        self.tokens.is_some()
    }
}
