mod bbox;
mod detection;
mod detect_image;
mod inference_device;
pub mod labels;
mod model_config;
pub mod model_layout;

pub use bbox::*;
pub use detection::*;
pub use detect_image::*;
pub use inference_device::*;
pub use labels::Labels;
pub use model_config::*;
pub use model_layout::ModelLayout;
