mod doctor_inference;
pub mod image_ops;
pub mod inference_process;
pub mod ort_classifier;
pub mod scorer;

pub use ort_classifier::*;
pub use scorer::Scorer;
