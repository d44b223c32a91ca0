use crate::common::inference_device::InferenceDevice;
use crate::common::model_layout::ModelLayout;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
pub const DEFAULT_INPUT_SIZE: u32 = 640;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub weights_path: String,
    /// `libonnxruntime` to load; `ORT_DYLIB_PATH` / system lookup when `None`.
    pub ort_lib_path: Option<String>,
    pub labels_path: Option<String>,
    pub layout: ModelLayout,
    pub inference_device: InferenceDevice,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            ort_lib_path: None,
            labels_path: None,
            layout: ModelLayout::default(),
            inference_device: InferenceDevice::default(),
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: String, layout: ModelLayout) -> Self {
        Self {
            weights_path,
            layout,
            ..Default::default()
        }
    }

    pub fn set_device_type(&mut self, device_type: InferenceDevice) {
        self.inference_device = device_type;
    }

    pub fn get_threshold(&self) -> f32 {
        self.conf_threshold
    }

    pub fn to_string(&self) -> String {
        format!("Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Model Layout: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {} (IoU {})",
                self.weights_path,
                self.labels_path.as_deref().unwrap_or("<built-in>"),
                self.ort_lib_path.as_deref().unwrap_or("<default>"),
                self.layout.name(), self.inference_device,
                self.width, self.height, self.conf_threshold, self.iou_threshold)
    }
}
