pub mod ort_engine;
pub mod ort_scorer;

pub use ort_engine::{OrtEngine, OrtTensorAttr, TensorLayout};
pub use ort_scorer::OrtScorer;
