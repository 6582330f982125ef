mod utils;
pub mod classification_runners;
pub mod common;
pub mod data;
pub mod diagnosis;
pub mod diagnosis_worker;
pub mod errors;

use std::time::Instant;

use crate::classification_runners::OrtScorer;
use crate::common::{DiagnosisResponse, ModelConfig, PlantDoctor};
use crate::data::ConfigOrt;

pub use crate::classification_runners::Scorer;
pub use crate::errors::{DiagnosisError, NormalizeError};

/// Builds the ONNX Runtime scorer described by `model_details`, dry runs
/// included.
pub fn load_scorer(model_details: &ModelConfig) -> anyhow::Result<OrtScorer> {
    let ort_options = ConfigOrt::try_from(model_details)?;

    log::info!(
        "Initializing ORT session with ({}) execution provider",
        model_details.inference_device
    );
    OrtScorer::new(&ort_options)
}

/// Startup entry point: the doctor that serves every request afterwards.
pub fn init_doctor(model_details: &ModelConfig) -> anyhow::Result<PlantDoctor> {
    log::debug!("init_doctor:\n{}", model_details);
    PlantDoctor::from_model_config(model_details)
}

/// One request, as the HTTP layer would answer it.
pub fn run_diagnosis(doctor: &PlantDoctor, image_bytes: &[u8]) -> DiagnosisResponse {
    let now = Instant::now();
    let outcome = doctor.infer(image_bytes);
    log::debug!("Processing time: {:?}", now.elapsed());
    DiagnosisResponse::from(outcome)
}
