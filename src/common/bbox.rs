use serde::{Deserialize, Serialize};

/// Axis-aligned box in pixel space, top-left origin.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BBox {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Sets the bounding box's coordinates using `(x1, y1, x2, y2)` and calculates width and height.
    pub fn with_x1y1_x2y2(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x = x1;
        self.y = y1;
        self.w = x2 - x1;
        self.h = y2 - y1;
        self
    }

    /// Sets the bounding box's coordinates and dimensions using `(x, y, w, h)`.
    pub fn with_x1y1_wh(mut self, x: f32, y: f32, w: f32, h: f32) -> Self {
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
        self
    }

    /// Sets the bounding box's coordinates and dimensions using `(cx, cy, w, h)`.
    pub fn with_cxcy_wh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x = cx - (w / 2.0);
        self.y = cy - (h / 2.0);
        self.w = w;
        self.h = h;
        self
    }

    /// Maps a box given as normalized `(ymin, xmin, ymax, xmax)` fractions onto an
    /// image of `img_w` x `img_h` pixels.
    ///
    /// This is the box order TF Object Detection API exports emit.
    pub fn from_normalized_yxyx(ymin: f32, xmin: f32, ymax: f32, xmax: f32, img_w: f32, img_h: f32) -> Self {
        Self::default().with_x1y1_x2y2(xmin * img_w, ymin * img_h, xmax * img_w, ymax * img_h)
    }

    pub fn x2(&self) -> f32 {
        self.x + self.w
    }

    pub fn y2(&self) -> f32 {
        self.y + self.h
    }

    pub fn cx(&self) -> f32 {
        self.x + self.w / 2.
    }

    pub fn cy(&self) -> f32 {
        self.y + self.h / 2.
    }

    pub fn area(&self) -> f32 {
        self.h * self.w
    }

    /// Computes the intersection area between this bounding box and another.
    pub fn intersect(&self, other: &BBox) -> f32 {
        let left = self.x.max(other.x);
        let right = self.x2().min(other.x2());
        let top = self.y.max(other.y);
        let bottom = self.y2().min(other.y2());
        (right - left).max(0.) * (bottom - top).max(0.)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &BBox) -> f32 {
        self.area() + other.area() - self.intersect(other)
    }

    pub fn iou(&self, other: &BBox) -> f32 {
        let union = self.union(other);
        if union <= 0. {
            return 0.;
        }
        self.intersect(other) / union
    }

    /// Clips the box to `[0, width] x [0, height]`.
    pub fn clamp_to(self, width: f32, height: f32) -> Self {
        let x1 = self.x.clamp(0., width);
        let y1 = self.y.clamp(0., height);
        let x2 = self.x2().clamp(0., width);
        let y2 = self.y2().clamp(0., height);
        Self::default().with_x1y1_x2y2(x1, y1, x2, y2)
    }

    pub fn as_xy_wh_i32(&self) -> (i32, i32, i32, i32) {
        (self.x.round() as i32,
         self.y.round() as i32,
         self.w.round() as i32,
         self.h.round() as i32)
    }
}
