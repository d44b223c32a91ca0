use anyhow::Result;
use image::{DynamicImage, RgbImage};

/// Decoded upload handed to the detection pipeline.
#[derive(Debug, Clone, Default)]
pub struct DetectImage {
    pub image: RgbImage,
    pub img_width: u32,
    pub img_height: u32,
    /// Per-request confidence threshold; the model default applies when `None`.
    pub threshold: Option<f32>,
}

impl std::ops::Deref for DetectImage {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for DetectImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8(), None)
    }
}

impl From<RgbImage> for DetectImage {
    fn from(image: RgbImage) -> Self {
        Self::new(image, None)
    }
}

impl DetectImage {
    pub fn new(image: RgbImage, threshold: Option<f32>) -> Self {
        let (img_width, img_height) = image.dimensions();
        Self {
            image,
            img_width,
            img_height,
            threshold,
        }
    }

    /// Decodes JPEG/PNG/WEBP bytes and converts them to RGB.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?;
        Ok(Self::from(image))
    }

    pub fn with_threshold(mut self, threshold: Option<f32>) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold_or(&self, default: f32) -> f32 {
        self.threshold.unwrap_or(default)
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.image
    }
}
