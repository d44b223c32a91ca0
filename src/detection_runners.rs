pub mod inference_process;
pub mod ort_detector;
mod worker;

pub use ort_detector::*;
pub use worker::*;
