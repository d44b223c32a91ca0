use crate::common::labels::{Labels, COCO_80, COCO_91};

/// Output convention of the loaded model.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ModelLayout {
    /// TF Object Detection API export (SSD MobileNet and friends):
    /// `detection_boxes [1,N,4]` normalized `ymin,xmin,ymax,xmax`,
    /// `detection_scores [1,N]`, `detection_classes [1,N]` (1-based),
    /// optional `num_detections [1]`. Takes a `u8` NHWC image.
    #[default] Ssd,
    /// Ultralytics YOLOv8 / YOLO11 export: one `[1, 4 + nc, anchors]` output with
    /// `cx,cy,w,h` in model pixels. Takes a letterboxed `f32` NCHW image; needs NMS.
    Yolo,
}

pub const SSD_BOXES: &str = "detection_boxes";
pub const SSD_SCORES: &str = "detection_scores";
pub const SSD_CLASSES: &str = "detection_classes";
pub const SSD_NUM: &str = "num_detections";

impl ModelLayout {
    pub fn from_str(layout: &str) -> Option<Self> {
        match layout.trim().to_lowercase().as_str() {
            "ssd" | "tf" | "tf-od" => Some(ModelLayout::Ssd),
            "yolo" | "yolov8" | "yolo11" | "yolov11" => Some(ModelLayout::Yolo),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelLayout::Ssd => "ssd",
            ModelLayout::Yolo => "yolo",
        }
    }

    /// Label table used when neither a labels file nor model metadata provides one.
    pub fn default_labels(&self) -> Labels {
        match self {
            ModelLayout::Ssd => Labels::from(&COCO_91[..]),
            ModelLayout::Yolo => Labels::from(&COCO_80[..]),
        }
    }
}
