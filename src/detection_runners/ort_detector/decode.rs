//! Turns raw model outputs into [`Detection`]s in original-image pixels.

use anyhow::{bail, Result};
use ndarray::{s, Axis, Ix2};
use ndarray::parallel::prelude::*;
use crate::common::{BBox, Detection, Labels};
use crate::detection_runners::ort_detector::input_wrapper::X;
use crate::detection_runners::ort_detector::nms::nms;

/// Decodes TF Object Detection API outputs.
///
/// `boxes` is `[1, N, 4]` normalized `ymin, xmin, ymax, xmax`; `scores` and `classes`
/// are `[1, N]`. Only the first `num` candidates are considered when `num` is given.
/// Candidates scoring below `threshold` are discarded.
pub fn decode_ssd(
    boxes: &X,
    scores: &X,
    classes: &X,
    num: Option<&X>,
    img_width: u32,
    img_height: u32,
    threshold: f32,
    labels: &Labels,
) -> Result<Vec<Detection>> {
    if boxes.ndim() != 3 || boxes.shape()[2] != 4 {
        bail!("Expected detection boxes shaped [1, N, 4], got {:?}", boxes.shape());
    }
    if scores.ndim() != 2 || classes.ndim() != 2 {
        bail!("Expected scores/classes shaped [1, N], got {:?} / {:?}", scores.shape(), classes.shape());
    }
    let n = boxes.shape()[1].min(scores.shape()[1]).min(classes.shape()[1]);
    let n = match num.and_then(|x| x.iter().next().copied()) {
        Some(count) if count >= 0. => (count as usize).min(n),
        _ => n,
    };

    let (w, h) = (img_width as f32, img_height as f32);
    let mut detections = Vec::new();
    for i in 0..n {
        let conf = scores[[0, i]];
        if conf < threshold {
            continue;
        }
        let class_id = classes[[0, i]].round() as i64;
        let bbox = BBox::from_normalized_yxyx(
            boxes[[0, i, 0]],
            boxes[[0, i, 1]],
            boxes[[0, i, 2]],
            boxes[[0, i, 3]],
            w,
            h,
        );
        detections.push(Detection::new(class_id, &labels.name(class_id), conf, bbox).rounded());
    }
    Ok(detections)
}

/// Decodes an Ultralytics `[1, 4 + nc, anchors]` output.
///
/// Boxes are `cx, cy, w, h` in letterboxed model pixels; `ratio` is the scale
/// applied by the letterbox. Runs per-class NMS with `iou_threshold`.
pub fn decode_yolo(
    preds: &X,
    ratio: f32,
    img_width: u32,
    img_height: u32,
    threshold: f32,
    iou_threshold: f32,
    labels: &Labels,
) -> Result<Vec<Detection>> {
    if preds.ndim() != 3 || preds.shape()[1] <= 4 {
        bail!("Expected predictions shaped [1, 4 + nc, anchors], got {:?}", preds.shape());
    }
    if ratio <= 0. {
        bail!("Invalid letterbox ratio {}", ratio);
    }
    let (w, h) = (img_width as f32, img_height as f32);

    // [4 + nc, anchors] -> [anchors, 4 + nc]
    let anchors = preds.index_axis(Axis(0), 0).into_dimensionality::<Ix2>()?.reversed_axes();
    let mut detections: Vec<Detection> = anchors
        .axis_iter(Axis(0))
        .into_par_iter()
        .filter_map(|row| {
            let (class_id, &confidence) = row
                .slice(s![4..])
                .into_iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))?;
            if confidence < threshold {
                return None;
            }
            let bbox = BBox::default()
                .with_cxcy_wh(row[0] / ratio, row[1] / ratio, row[2] / ratio, row[3] / ratio)
                .clamp_to(w, h);
            let class_id = class_id as i64;
            Some(Detection::new(class_id, &labels.name(class_id), confidence, bbox).rounded())
        })
        .collect();

    nms(&mut detections, iou_threshold);
    Ok(detections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::labels::{COCO_80, COCO_91};

    fn ssd_outputs() -> (X, X, X) {
        let boxes = X::from_shape_vec(&[1, 3, 4], vec![
            0.1, 0.2, 0.5, 0.6,
            0.0, 0.0, 1.0, 1.0,
            0.3, 0.3, 0.4, 0.4,
        ]).unwrap();
        let scores = X::from_shape_vec(&[1, 3], vec![0.9, 0.3, 0.1]).unwrap();
        let classes = X::from_shape_vec(&[1, 3], vec![1., 3., 18.]).unwrap();
        (boxes, scores, classes)
    }

    #[test]
    fn ssd_filters_and_rescales() {
        let (boxes, scores, classes) = ssd_outputs();
        let labels = Labels::from(&COCO_91[..]);
        let dets = decode_ssd(&boxes, &scores, &classes, None, 1000, 500, 0.25, &labels).unwrap();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].class_name, "person");
        assert_eq!(dets[0].bbox.x, 200.);
        assert_eq!(dets[0].bbox.y, 50.);
        assert!((dets[0].bbox.w - 400.).abs() < 1e-3);
        assert!((dets[0].bbox.h - 200.).abs() < 1e-3);
        assert_eq!(dets[1].class_name, "car");
    }

    #[test]
    fn ssd_respects_num_detections() {
        let (boxes, scores, classes) = ssd_outputs();
        let num = X::from(vec![1.0]);
        let labels = Labels::from(&COCO_91[..]);
        let dets = decode_ssd(&boxes, &scores, &classes, Some(&num), 10, 10, 0.0, &labels).unwrap();
        assert_eq!(dets.len(), 1);
    }

    #[test]
    fn ssd_rejects_bad_shapes() {
        let (_, scores, classes) = ssd_outputs();
        let boxes = X::from_shape_vec(&[1, 3, 2], vec![0.; 6]).unwrap();
        assert!(decode_ssd(&boxes, &scores, &classes, None, 1, 1, 0.5, &Labels::default()).is_err());
    }

    #[test]
    fn yolo_decodes_and_suppresses() {
        // 2 classes, 3 anchors; layout [1, 6, 3]
        #[rustfmt::skip]
        let preds = X::from_shape_vec(&[1, 6, 3], vec![
            // cx
            50., 52., 10.,
            // cy
            50., 50., 10.,
            // w
            20., 20., 4.,
            // h
            20., 20., 4.,
            // class 0
            0.9, 0.8, 0.1,
            // class 1
            0.1, 0.2, 0.2,
        ]).unwrap();
        let labels = Labels::from(&COCO_80[..]);
        let dets = decode_yolo(&preds, 0.5, 200, 200, 0.25, 0.45, &labels).unwrap();
        assert_eq!(dets.len(), 1);
        assert_eq!(dets[0].class_name, "person");
        assert_eq!(dets[0].conf, 0.9);
        assert_eq!(dets[0].bbox, BBox::new(80., 80., 40., 40.));
    }

    #[test]
    fn yolo_keeps_different_classes_on_one_box() {
        // the same box scored as class 0 by one anchor and class 1 by the other
        #[rustfmt::skip]
        let preds = X::from_shape_vec(&[1, 6, 2], vec![
            50., 50.,
            50., 50.,
            20., 20.,
            20., 20.,
            0.9, 0.1,
            0.1, 0.8,
        ]).unwrap();
        let labels = Labels::from(&["person", "backpack"][..]);
        let dets = decode_yolo(&preds, 1.0, 200, 200, 0.25, 0.45, &labels).unwrap();
        let kept: Vec<_> = dets.iter().map(|d| (d.class_name.as_str(), d.conf)).collect();
        assert_eq!(kept, vec![("person", 0.9), ("backpack", 0.8)]);
    }
}
