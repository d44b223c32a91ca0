use serde::{Deserialize, Serialize};
use crate::common::BBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// One predicted object instance.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: i64,
    pub class_name: String,
    pub conf: f32,
    #[serde(rename = "box")]
    pub bbox: BBox,
}

impl Nms for Detection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.conf
    }

    fn class_id(&self) -> i64 {
        self.class_id
    }
}

impl Detection {
    pub fn new(class_id: i64, class_name: &str, conf: f32, bbox: BBox) -> Self {
        Self {
            class_id,
            class_name: class_name.to_string(),
            conf,
            bbox,
        }
    }

    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = bbox;
        self
    }

    pub fn with_confidence(mut self, conf: f32) -> Self {
        self.conf = conf;
        self
    }

    pub fn with_class_id(mut self, class_id: i64) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.class_name = label.to_string();
        self
    }

    /// Confidence as reported to clients, rounded to four decimals.
    pub fn rounded(mut self) -> Self {
        self.conf = (self.conf * 10_000.).round() / 10_000.;
        self
    }

    /// Overlay caption, e.g. `person 0.87`.
    pub fn caption(&self) -> String {
        format!("{} {:.2}", self.class_name, self.conf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_box_field_name() {
        let det = Detection::new(1, "person", 0.5, BBox::new(1., 2., 3., 4.));
        let json = serde_json::to_value(&det).unwrap();
        assert_eq!(json["box"]["x"], 1.0);
        assert_eq!(json["box"]["h"], 4.0);
        assert_eq!(json["class_name"], "person");
        assert!(json.get("bbox").is_none());
    }

    #[test]
    fn rounds_confidence_to_four_decimals() {
        let det = Detection::default().with_confidence(0.876_54).rounded();
        assert!((det.conf - 0.8765).abs() < 1e-6);
        assert_eq!(det.caption(), " 0.88");
    }
}
