#![allow(dead_code)]

use std::io::Cursor;
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use image::{DynamicImage, ImageFormat, RgbImage};

use blindspot::common::labels::COCO_91;
use blindspot::common::model_layout::{SSD_BOXES, SSD_CLASSES, SSD_NUM, SSD_SCORES};
use blindspot::common::{DetectImage, Detection, Labels};
use blindspot::detection_runners::decode::decode_ssd;
use blindspot::detection_runners::inference_process::InferenceProcess;
use blindspot::detection_runners::input_wrapper::{X, Xs};

/// Stands in for an SSD model: always predicts a `person` with 0.9 and a
/// whole-frame `car` with 0.3.
pub struct FakeSsd {
    /// Signalled when a run starts.
    pub started: Option<Sender<()>>,
    /// When present, every run waits for one message.
    pub gate: Option<Receiver<()>>,
    /// Images of this width make the run panic.
    pub panic_on_width: Option<u32>,
}

impl FakeSsd {
    pub fn new() -> Self {
        Self { started: None, gate: None, panic_on_width: None }
    }

    pub fn gated(started: Sender<()>, gate: Receiver<()>) -> Self {
        Self { started: Some(started), gate: Some(gate), panic_on_width: None }
    }

    pub fn panicking_on_width(width: u32) -> Self {
        Self { panic_on_width: Some(width), ..Self::new() }
    }
}

impl InferenceProcess for FakeSsd {
    fn preprocess(&self, x: &DetectImage) -> Result<Xs> {
        if self.panic_on_width == Some(x.img_width) {
            panic!("corrupt input of width {}", x.img_width);
        }
        Ok(Xs::from(X::from(vec![x.img_width as f32, x.img_height as f32])))
    }

    fn inference(&mut self, _xs: Xs) -> Result<Xs> {
        if let Some(started) = &self.started {
            let _ = started.send(());
        }
        if let Some(gate) = &self.gate {
            gate.recv()?;
        }
        let mut ys = Xs::new();
        ys.push_kv(SSD_BOXES, X::from_shape_vec(&[1, 2, 4], vec![
            0.1, 0.2, 0.5, 0.6,
            0.0, 0.0, 1.0, 1.0,
        ])?)?;
        ys.push_kv(SSD_SCORES, X::from_shape_vec(&[1, 2], vec![0.9, 0.3])?)?;
        ys.push_kv(SSD_CLASSES, X::from_shape_vec(&[1, 2], vec![1., 3.])?)?;
        ys.push_kv(SSD_NUM, X::from(vec![2.]))?;
        Ok(ys)
    }

    fn postprocess(&self, xs: Xs, x0: &DetectImage) -> Result<Vec<Detection>> {
        decode_ssd(
            xs.require(SSD_BOXES)?,
            xs.require(SSD_SCORES)?,
            xs.require(SSD_CLASSES)?,
            xs.get(SSD_NUM),
            x0.img_width,
            x0.img_height,
            x0.threshold_or(0.25),
            &Labels::from(&COCO_91[..]),
        )
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .unwrap();
    buf
}

pub const BOUNDARY: &str = "blindspot-test-boundary";

/// A multipart body with a single `file` field.
pub fn multipart_file(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}
