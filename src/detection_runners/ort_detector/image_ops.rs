//! Functions to turn a decoded RGB image into model input tensors.

use anyhow::{bail, Result};
use fast_image_resize::{
    images::{CroppedImageMut, Image as FirImage},
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::RgbImage;
use rayon::prelude::*;
use crate::detection_runners::ort_detector::input_wrapper::X;

/// Grey used by Ultralytics to pad letterboxed inputs.
pub const LETTERBOX_FILL: u8 = 114;

pub fn to_fir_image(image: RgbImage) -> Result<FirImage<'static>> {
    let (width, height) = image.dimensions();
    Ok(FirImage::from_vec_u8(width, height, image.into_raw(), PixelType::U8x3)?)
}

fn resize_options() -> ResizeOptions {
    ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear))
}

/// Stretches `img` to exactly `target_w` x `target_h`.
pub fn resize_exact(img: &FirImage, target_w: u32, target_h: u32) -> Result<FirImage<'static>> {
    let mut dst = FirImage::new(target_w, target_h, PixelType::U8x3);
    if img.width() == target_w && img.height() == target_h {
        dst.buffer_mut().copy_from_slice(img.buffer());
        return Ok(dst);
    }
    let mut resizer = Resizer::new();
    resizer.resize(img, &mut dst, &resize_options())?;
    Ok(dst)
}

/// Scales `img` to fit inside `target_w` x `target_h` keeping its aspect ratio and
/// pads the remainder on the right/bottom. Returns the padded image and the scale ratio.
pub fn letterbox(img: &FirImage, target_w: u32, target_h: u32) -> Result<(FirImage<'static>, f32)> {
    let (w0, h0) = (img.width(), img.height());
    if w0 == 0 || h0 == 0 {
        bail!("Cannot letterbox an empty image");
    }
    let ratio = (target_w as f32 / w0 as f32).min(target_h as f32 / h0 as f32);
    let new_w = ((w0 as f32 * ratio).round() as u32).clamp(1, target_w);
    let new_h = ((h0 as f32 * ratio).round() as u32).clamp(1, target_h);

    let mut padded = FirImage::from_vec_u8(
        target_w,
        target_h,
        vec![LETTERBOX_FILL; (target_w * target_h * 3) as usize],
        PixelType::U8x3,
    )?;

    let mut resizer = Resizer::new();
    let mut cropped = CroppedImageMut::new(&mut padded, 0, 0, new_w, new_h)?;
    resizer.resize(img, &mut cropped, &resize_options())?;

    Ok((padded, ratio))
}

/// Raw pixels as a `[1, H, W, 3]` tensor (values 0..=255).
pub fn nhwc_tensor(img: &FirImage) -> Result<X> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let buf = img.buffer();
    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }
    let data: Vec<f32> = buf.par_iter().map(|&v| v as f32).collect();
    X::from_shape_vec(&[1, h, w, 3], data)
}

/// Pixels scaled to `[0, 1]` as a `[1, 3, H, W]` tensor.
pub fn nchw_normalized_tensor(img: &FirImage) -> Result<X> {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let buf = img.buffer();
    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }
    let hw = w * h;
    let mut out = vec![0.0f32; buf.len()];
    out.par_chunks_mut(hw)
        .enumerate()
        .for_each(|(channel, plane)| {
            for (i, v) in plane.iter_mut().enumerate() {
                *v = buf[3 * i + channel] as f32 / 255.0;
            }
        });
    X::from_shape_vec(&[1, 3, h, w], out)
}
