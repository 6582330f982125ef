mod config_ort;
mod time_calc;
pub mod send_channels;

pub use config_ort::ConfigOrt;
pub use time_calc::TimeCalc;

pub use crate::classification_runners::image_ops::{normalize, ResizeFilter};

pub(crate) const CROSS_MARK: &str = "❌";
