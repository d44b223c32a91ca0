use clap::builder::BoolishValueParser;
use clap::Parser;

use crate::common::{InferenceDevice, ModelConfig, ModelLayout, DEFAULT_CONF_THRESHOLD, DEFAULT_INPUT_SIZE, DEFAULT_IOU_THRESHOLD};
use crate::speech::{DEFAULT_TTS_URL, DEFAULT_WHISPER_MODEL};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Server options; every flag can also be set through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "blindspot-server", version, about = "BlindSpot accessibility API")]
pub struct ServerConfig {
    #[arg(long, env = "BLINDSPOT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "BLINDSPOT_PORT", default_value_t = 8000)]
    pub port: u16,

    /// ONNX detection model; `/detect` answers 503 without one.
    #[arg(long, env = "MODEL_PATH")]
    pub model_path: Option<String>,

    #[arg(long, env = "ORT_LIB_PATH")]
    pub ort_lib_path: Option<String>,

    /// Text file with one class name per line.
    #[arg(long, env = "LABELS_PATH")]
    pub labels_path: Option<String>,

    /// `ssd` (TF Object Detection API export) or `yolo` (Ultralytics export).
    #[arg(long, env = "MODEL_LAYOUT", default_value = "ssd", value_parser = parse_layout)]
    pub model_layout: ModelLayout,

    /// `cpu`, `cuda` or `cuda:<id>`.
    #[arg(long, env = "INFERENCE_DEVICE", default_value = "cpu", value_parser = parse_device)]
    pub inference_device: InferenceDevice,

    #[arg(long, env = "CONF_THRESHOLD", default_value_t = DEFAULT_CONF_THRESHOLD)]
    pub conf_threshold: f32,

    #[arg(long, env = "IOU_THRESHOLD", default_value_t = DEFAULT_IOU_THRESHOLD)]
    pub iou_threshold: f32,

    #[arg(long, env = "MODEL_WIDTH", default_value_t = DEFAULT_INPUT_SIZE)]
    pub model_width: u32,

    #[arg(long, env = "MODEL_HEIGHT", default_value_t = DEFAULT_INPUT_SIZE)]
    pub model_height: u32,

    /// Detection jobs allowed to wait before requests are turned away.
    #[arg(long, env = "DETECT_QUEUE", default_value_t = 4)]
    pub detect_queue: usize,

    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[arg(long, env = "ENABLE_AUTH", default_value_t = false, action = clap::ArgAction::Set, value_parser = BoolishValueParser::new())]
    pub enable_auth: bool,

    /// Required when auth is enabled.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(
        long,
        env = "JWT_TTL_DAYS",
        default_value_t = crate::accounts::DEFAULT_TOKEN_TTL_DAYS,
        value_parser = clap::value_parser!(i64).range(1..=crate::accounts::MAX_TOKEN_TTL_DAYS)
    )]
    pub jwt_ttl_days: i64,

    /// `*` or a comma separated list of origins.
    #[arg(long, env = "CORS_ORIGINS", default_value = "*")]
    pub cors_origins: String,

    #[arg(long, env = "TTS_URL", default_value = DEFAULT_TTS_URL)]
    pub tts_url: String,

    /// Base URL of an OpenAI-compatible Whisper server; `/stt` answers 503 without one.
    #[arg(long, env = "STT_URL")]
    pub stt_url: Option<String>,

    #[arg(long, env = "STT_API_KEY", hide_env_values = true)]
    pub stt_api_key: Option<String>,

    #[arg(long, env = "WHISPER_MODEL", default_value = DEFAULT_WHISPER_MODEL)]
    pub whisper_model: String,
}

fn parse_layout(s: &str) -> Result<ModelLayout, String> {
    ModelLayout::from_str(s).ok_or_else(|| format!("unknown model layout `{s}` (expected ssd or yolo)"))
}

fn parse_device(s: &str) -> Result<InferenceDevice, String> {
    InferenceDevice::from_str(s).ok_or_else(|| format!("unknown inference device `{s}`"))
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Detection settings, when a model is configured.
    pub fn model_config(&self) -> Option<ModelConfig> {
        let weights_path = self.model_path.clone()?;
        let mut model_details = ModelConfig::new(weights_path, self.model_layout);
        model_details.ort_lib_path = self.ort_lib_path.clone();
        model_details.labels_path = self.labels_path.clone();
        model_details.set_device_type(self.inference_device);
        model_details.conf_threshold = self.conf_threshold;
        model_details.iou_threshold = self.iou_threshold;
        model_details.width = self.model_width;
        model_details.height = self.model_height;
        Some(model_details)
    }

    /// `None` means any origin.
    pub fn cors_list(&self) -> Option<Vec<String>> {
        let origins = self.cors_origins.trim();
        if origins == "*" || origins.is_empty() {
            return None;
        }
        Some(
            origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
        )
    }
}
