//! Options for building an ONNX Runtime detector.

use crate::common::{InferenceDevice, Labels, ModelConfig, ModelLayout, DEFAULT_CONF_THRESHOLD, DEFAULT_IOU_THRESHOLD, DEFAULT_INPUT_SIZE};

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: String,
    pub ort_lib_path: Option<String>,
    pub device: InferenceDevice,
    pub layout: ModelLayout,
    pub model_width: u32,
    pub model_height: u32,
    pub conf: f32,
    pub iou: f32,
    pub names: Option<Labels>,
    pub num_dry_run: usize,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: String::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            layout: ModelLayout::default(),
            model_width: DEFAULT_INPUT_SIZE,
            model_height: DEFAULT_INPUT_SIZE,
            conf: DEFAULT_CONF_THRESHOLD,
            iou: DEFAULT_IOU_THRESHOLD,
            names: None,
            num_dry_run: 1,
        }
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Self {
        self.onnx_path = onnx_path.to_string();
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: Option<&str>) -> Self {
        self.ort_lib_path = ort_lib_path.map(|x| x.to_string());
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_layout(mut self, layout: ModelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_conf(mut self, x: f32) -> Self {
        self.conf = x;
        self
    }

    pub fn with_iou(mut self, x: f32) -> Self {
        self.iou = x;
        self
    }

    pub fn with_names(mut self, names: Labels) -> Self {
        self.names = Some(names);
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }
}

impl TryFrom<&ModelConfig> for ConfigOrt {
    type Error = anyhow::Error;

    fn try_from(model_details: &ModelConfig) -> Result<Self, Self::Error> {
        let mut options = ConfigOrt::new()
            .with_model(&model_details.weights_path)
            .with_ort_lib_path(model_details.ort_lib_path.as_deref())
            .with_device(model_details.inference_device)
            .with_layout(model_details.layout)
            .with_model_width(model_details.width)
            .with_model_height(model_details.height)
            .with_conf(model_details.get_threshold())
            .with_iou(model_details.iou_threshold);

        if let Some(labels_path) = &model_details.labels_path {
            let names = Labels::from_file(labels_path)
                .map_err(|e| anyhow::anyhow!("Failed to read labels from {}: {}", labels_path, e))?;
            options = options.with_names(names);
        }
        Ok(options)
    }
}
