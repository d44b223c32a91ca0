pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    fn class_id(&self) -> i64;
}

/// Greedy per-class non-maximum suppression: keeps the most confident box of
/// every same-class cluster whose pairwise IoU exceeds `iou_threshold`.
/// Overlapping boxes of different classes are all kept.
pub fn nms<T: Nms>(boxes: &mut Vec<T>, iou_threshold: f32) {
    boxes.sort_by(|b1, b2| {
        b2.confidence()
            .partial_cmp(&b1.confidence())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut current_index = 0;
    for index in 0..boxes.len() {
        let mut drop = false;
        for prev_index in 0..current_index {
            if boxes[prev_index].class_id() != boxes[index].class_id() {
                continue;
            }
            let iou = boxes[prev_index].iou(&boxes[index]);
            if iou > iou_threshold {
                drop = true;
                break;
            }
        }
        if !drop {
            boxes.swap(current_index, index);
            current_index += 1;
        }
    }
    boxes.truncate(current_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{BBox, Detection};

    #[test]
    fn suppresses_overlapping_lower_scores() {
        let mut dets = vec![
            Detection::new(0, "a", 0.6, BBox::new(0., 0., 10., 10.)),
            Detection::new(0, "a", 0.9, BBox::new(1., 1., 10., 10.)),
            Detection::new(0, "a", 0.5, BBox::new(50., 50., 10., 10.)),
        ];
        nms(&mut dets, 0.45);
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].conf, 0.9);
        assert_eq!(dets[1].conf, 0.5);
    }

    #[test]
    fn keeps_overlapping_boxes_of_other_classes() {
        let mut dets = vec![
            Detection::new(24, "backpack", 0.8, BBox::new(0., 0., 10., 10.)),
            Detection::new(0, "person", 0.9, BBox::new(0., 0., 10., 10.)),
            Detection::new(0, "person", 0.7, BBox::new(1., 0., 10., 10.)),
        ];
        nms(&mut dets, 0.45);
        let kept: Vec<_> = dets.iter().map(|d| (d.class_name.as_str(), d.conf)).collect();
        assert_eq!(kept, vec![("person", 0.9), ("backpack", 0.8)]);
    }
}
