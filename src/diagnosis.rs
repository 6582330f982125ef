pub mod label_codec;
pub mod ranking;
pub mod recommendations;

pub use recommendations::{recommend, DiseaseCategory};
