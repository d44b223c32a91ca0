use std::time::Instant;
use crate::common::{DetectImage, Detection};
use crate::detection_runners::ort_detector::input_wrapper::Xs;
use crate::utils;

/// A detector split into the three stages every backend goes through.
///
/// Implementations own whatever session they run and are driven from a
/// single thread, so only `Send` is required.
pub trait InferenceProcess: Send {
    /// Turns the decoded image into model inputs.
    fn preprocess(&self, x: &DetectImage) -> anyhow::Result<Xs>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, xs: Xs) -> anyhow::Result<Xs>;

    /// Decodes model outputs into detections in `x0`'s pixel space.
    /// `x0.threshold` overrides the configured confidence threshold.
    fn postprocess(&self, xs: Xs, x0: &DetectImage) -> anyhow::Result<Vec<Detection>>;

    /// Executes the full pipeline.
    fn run(&mut self, x: &DetectImage) -> anyhow::Result<Vec<Detection>> {
        let detect_time = Instant::now();
        let mut _detect_elapsed = detect_time.elapsed();

        let ys = self.preprocess(x)?;
        _detect_elapsed = utils::trace("TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let ys = self.inference(ys)?;
        _detect_elapsed = utils::trace("TIME", "Detection run", detect_time, _detect_elapsed);

        let ys = self.postprocess(ys, x)?;
        utils::trace("TIME", "Postprocessing", detect_time, _detect_elapsed);

        Ok(ys)
    }
}
