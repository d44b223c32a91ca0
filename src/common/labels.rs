use std::path::Path;
use anyhow::Result;
use regex::Regex;
use crate::utils;

/// COCO 2017 category names indexed by the 1-based ids TF Object Detection API models emit.
/// Unused ids are `N/A`.
pub const COCO_91: [&str; 91] = [
    "background", "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "N/A", "stop sign", "parking meter", "bench", "bird",
    "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "N/A",
    "backpack", "umbrella", "N/A", "N/A", "handbag", "tie", "suitcase", "frisbee", "skis",
    "snowboard", "sports ball", "kite", "baseball bat", "baseball glove", "skateboard",
    "surfboard", "tennis racket", "bottle", "N/A", "wine glass", "cup", "fork", "knife", "spoon",
    "bowl", "banana", "apple", "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza",
    "donut", "cake", "chair", "couch", "potted plant", "bed", "N/A", "dining table", "N/A", "N/A",
    "toilet", "N/A", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone", "microwave",
    "oven", "toaster", "sink", "refrigerator", "N/A", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// The 80 contiguous COCO classes used by Ultralytics exports (0-based).
pub const COCO_80: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat", "dog",
    "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack", "umbrella",
    "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball", "kite",
    "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket", "bottle",
    "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch", "potted plant",
    "bed", "dining table", "toilet", "tv", "laptop", "mouse", "remote", "keyboard", "cell phone",
    "microwave", "oven", "toaster", "sink", "refrigerator", "book", "clock", "vase", "scissors",
    "teddy bear", "hair drier", "toothbrush",
];

/// Class id to name table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Labels(Vec<String>);

impl From<&[&str]> for Labels {
    fn from(names: &[&str]) -> Self {
        Self(names.iter().map(|x| x.to_string()).collect())
    }
}

impl From<Vec<String>> for Labels {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl Labels {
    /// Reads one label per line, skipping blank lines.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let lines = utils::file_to_vec(path)?;
        Ok(Self(lines.into_iter().map(|l| l.trim().to_string()).filter(|l| !l.is_empty()).collect()))
    }

    /// Parses the dict-style `names` string found in Ultralytics ONNX metadata:
    /// `{0: 'person', 1: 'bicycle', 2: 'sports ball', ..., 27: "yellow_lady's_slipper"}`
    pub fn from_metadata(names: &str) -> Option<Self> {
        let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).ok()?;
        let names: Vec<String> = re
            .captures_iter(names)
            .map(|x| x.extract())
            .map(|(_, [_, name, _])| name.to_string())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(Self(names))
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name for `id`, or the id itself when the table has no entry.
    pub fn name(&self, id: i64) -> String {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.0.get(i))
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}
