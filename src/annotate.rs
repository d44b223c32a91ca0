//! Overlay rendering for `/detect?return_image=true`.

use ab_glyph::{FontRef, PxScale};
use anyhow::Result;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use crate::common::Detection;

pub const BOX_COLOUR: Rgb<u8> = Rgb([66, 135, 245]);
pub const TEXT_COLOUR: Rgb<u8> = Rgb([255, 255, 255]);
pub const BOX_THICKNESS: i32 = 3;
pub const JPEG_QUALITY: u8 = 85;
const LABEL_SCALE: f32 = 14.0;
const LABEL_OFFSET: f32 = 16.0;

static FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Draws every detection onto `img`: an outlined box growing inwards and
/// a `"{class_name} {conf:.2}"` caption just above it.
pub fn draw_detections(img: &mut RgbImage, detections: &[Detection]) -> Result<()> {
    let font = FontRef::try_from_slice(FONT_BYTES)?;
    let scale = PxScale::from(LABEL_SCALE);

    for det in detections {
        let (x, y, w, h) = det.bbox.as_xy_wh_i32();
        for i in 0..BOX_THICKNESS {
            let (rw, rh) = (w - 2 * i, h - 2 * i);
            if rw <= 0 || rh <= 0 {
                break;
            }
            draw_hollow_rect_mut(img, Rect::at(x + i, y + i).of_size(rw as u32, rh as u32), BOX_COLOUR);
        }

        let tx = (det.bbox.x + 4.).round() as i32;
        let ty = (det.bbox.y - LABEL_OFFSET).max(0.).round() as i32;
        draw_text_mut(img, TEXT_COLOUR, tx, ty, scale, &font, &det.caption());
    }
    Ok(())
}

pub fn encode_jpeg(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder.encode_image(img)?;
    Ok(buf)
}

pub fn to_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", base64::engine::general_purpose::STANDARD.encode(jpeg))
}

/// Annotates a copy of `img` and returns it as a JPEG data URL.
pub fn render_data_url(img: &RgbImage, detections: &[Detection]) -> Result<String> {
    let mut canvas = img.clone();
    draw_detections(&mut canvas, detections)?;
    Ok(to_data_url(&encode_jpeg(&canvas)?))
}
