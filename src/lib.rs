mod utils;
pub mod accounts;
pub mod annotate;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod server;
pub mod speech;

use std::time::Instant;
use crate::common::{DetectImage, Detection, ModelConfig};
use crate::data::ConfigOrt;
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::OrtDetector;

/// Loads the model described by `model_details` and warms it up.
pub fn init_detector(model_details: &ModelConfig) -> anyhow::Result<OrtDetector> {
    log::info!("Initializing detector\n{}", model_details.to_string());
    let ort_options = ConfigOrt::try_from(model_details)?;

    log::info!("Initializing ORT session with ({}) execution provider", model_details.inference_device);
    OrtDetector::new(ort_options)
}

/// Runs one image through `detector`.
pub fn run_detection<P: InferenceProcess + ?Sized>(detector: &mut P, image: &DetectImage) -> anyhow::Result<Vec<Detection>> {
    let now = Instant::now();

    let detections = detector.run(image)?;

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(detections)
}
