mod class_vocabulary;
mod classification_result;
mod image_tensor;
mod inference_device;
mod model_config;
mod plant_doctor;
mod score_vector;
mod severity;

pub use class_vocabulary::*;
pub use classification_result::*;
pub use image_tensor::*;
pub use inference_device::*;
pub use model_config::*;
pub use plant_doctor::*;
pub use score_vector::*;
pub use severity::*;
