mod config_ort;
mod time_calc;

pub use config_ort::ConfigOrt;
pub use time_calc::TimeCalc;

pub(crate) const CROSS_MARK: &str = "❌";
