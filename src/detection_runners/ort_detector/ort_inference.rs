use anyhow::Result;
use image::RgbImage;

use crate::common::model_layout::{SSD_BOXES, SSD_CLASSES, SSD_NUM, SSD_SCORES};
use crate::common::{DetectImage, Detection, Labels, ModelLayout};
use crate::data::ConfigOrt;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::ort_detector::decode::{decode_ssd, decode_yolo};
use crate::detection_runners::ort_detector::image_ops;
use crate::detection_runners::ort_detector::input_wrapper::Xs;
use crate::detection_runners::ort_detector::OrtEngine;

/// Object detector over an ONNX model in either [`ModelLayout`].
#[derive(Debug)]
pub struct OrtDetector {
    engine: OrtEngine,
    layout: ModelLayout,
    /// Model input size; `None` feeds the image at its own size (SSD with dynamic axes).
    input_size: Option<(u32, u32)>,
    conf: f32,
    iou: f32,
    names: Labels,
}

impl OrtDetector {
    pub fn new(options: ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(&options)?;

        let input_size = match options.layout {
            ModelLayout::Ssd => engine.in_shape(0).and_then(Self::static_hw_nhwc),
            ModelLayout::Yolo => Some(
                engine
                    .in_shape(0)
                    .and_then(Self::static_hw_nchw)
                    .unwrap_or((options.model_width, options.model_height)),
            ),
        };

        // Class names: labels file > model metadata > built-in table
        let names = match options.names {
            Some(names) => names,
            None => match engine.try_fetch("names").as_deref().and_then(Labels::from_metadata) {
                Some(names) => names,
                None => options.layout.default_labels(),
            },
        };

        log::info!(
            "Layout: {} | Input: {} | Classes: {} | Conf: {} | IoU: {}",
            options.layout.name(),
            input_size.map(|(w, h)| format!("{w}x{h}")).unwrap_or_else(|| "dynamic".to_string()),
            names.len(),
            options.conf,
            options.iou,
        );

        let mut detector = Self {
            engine,
            layout: options.layout,
            input_size,
            conf: options.conf,
            iou: options.iou,
            names,
        };

        let (w, h) = input_size.unwrap_or((options.model_width, options.model_height));
        let blank = DetectImage::from(RgbImage::new(w.max(1), h.max(1)));
        for _ in 0..options.num_dry_run {
            detector.run(&blank)?;
        }
        detector.engine.infer_time.clear();

        Ok(detector)
    }

    fn static_hw_nhwc(shape: &[i64]) -> Option<(u32, u32)> {
        match shape {
            [_, h, w, _] if *h > 0 && *w > 0 => Some((*w as u32, *h as u32)),
            _ => None,
        }
    }

    fn static_hw_nchw(shape: &[i64]) -> Option<(u32, u32)> {
        match shape {
            [_, _, h, w] if *h > 0 && *w > 0 => Some((*w as u32, *h as u32)),
            _ => None,
        }
    }

    pub fn layout(&self) -> ModelLayout {
        self.layout
    }

    pub fn names(&self) -> &Labels {
        &self.names
    }

    pub fn engine(&self) -> &OrtEngine {
        &self.engine
    }
}

impl InferenceProcess for OrtDetector {
    fn preprocess(&self, x: &DetectImage) -> Result<Xs> {
        let img = image_ops::to_fir_image(x.image.clone())?;
        let xs_ = match (self.layout, self.input_size) {
            (ModelLayout::Ssd, None) => image_ops::nhwc_tensor(&img)?,
            (ModelLayout::Ssd, Some((w, h))) => image_ops::nhwc_tensor(&image_ops::resize_exact(&img, w, h)?)?,
            (ModelLayout::Yolo, size) => {
                let (w, h) = size.unwrap_or((x.img_width, x.img_height));
                let (padded, _) = image_ops::letterbox(&img, w, h)?;
                image_ops::nchw_normalized_tensor(&padded)?
            }
        };
        Ok(Xs::from(xs_))
    }

    fn inference(&mut self, xs: Xs) -> Result<Xs> {
        let ys = self.engine.engine_run(xs)?;
        log::debug!("ORT timings | {}", self.engine.timings());
        Ok(ys)
    }

    fn postprocess(&self, xs: Xs, x0: &DetectImage) -> Result<Vec<Detection>> {
        let threshold = x0.threshold_or(self.conf);
        match self.layout {
            ModelLayout::Ssd => decode_ssd(
                xs.require(SSD_BOXES)?,
                xs.require(SSD_SCORES)?,
                xs.require(SSD_CLASSES)?,
                xs.get(SSD_NUM),
                x0.img_width,
                x0.img_height,
                threshold,
                &self.names,
            ),
            ModelLayout::Yolo => {
                let (w, h) = self.input_size.unwrap_or((x0.img_width, x0.img_height));
                let ratio = (w as f32 / x0.img_width as f32).min(h as f32 / x0.img_height as f32);
                decode_yolo(&xs[0], ratio, x0.img_width, x0.img_height, threshold, self.iou, &self.names)
            }
        }
    }
}
