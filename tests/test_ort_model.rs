extern crate leaf_doctor;

use std::path::Path;
use std::time::Instant;

use leaf_doctor::common::{InferenceDevice, ModelConfig};


use fixtures::{init_logger, leaf_png};

/// Needs a real model and runtime:
///
/// LEAF_DOCTOR_MODEL=models/plant_disease.onnx \
/// ORT_LIB_PATH=onnxruntime/lib/libonnxruntime.so \
/// LEAF_DOCTOR_DEVICE=cuda:0 \
/// LEAF_DOCTOR_IMAGE=tests/leaf.jpg \
/// cargo test -- --ignored
#[test]
#[ignore]
fn diagnosis_with_onnx_model() {
    init_logger();

    /////////////////////
    // Testing variables
    let loop_count: u32 = 10;
    let onnx_path = std::env::var("LEAF_DOCTOR_MODEL").expect("LEAF_DOCTOR_MODEL not set");
    let lib_path = std::env::var("ORT_LIB_PATH").ok();
    let device = std::env::var("LEAF_DOCTOR_DEVICE").unwrap_or_else(|_| "cpu".to_string());
    let image_path = std::env::var("LEAF_DOCTOR_IMAGE").ok();
    /////////////////////

    let mut model_details = ModelConfig::new(onnx_path, InferenceDevice::parse(&device).unwrap_or_default());
    model_details.ort_lib_path = lib_path;
    model_details.profile = true;

    let doctor = leaf_doctor::init_doctor(&model_details).unwrap();
    assert!(doctor.is_model_loaded(), "Failed to load {}", model_details.weights_path);

    let image_bytes = match image_path {
        Some(path) => std::fs::read(Path::new(env!("CARGO_MANIFEST_DIR")).join(path)).unwrap(),
        None => leaf_png(256, 256),
    };

    for _ in 0..loop_count {
        let now = Instant::now();
        let report = doctor.infer(&image_bytes).unwrap();
        println!("Processing time: {:?}", now.elapsed());
        report.print_result();

        assert!((0.0..=100.0).contains(&report.confidence()));
        assert_eq!(report.alternatives().len(), 5.min(doctor.vocabulary().len()));
    }
}

#[test]
fn missing_model_leaves_doctor_unloaded() {
    init_logger();
    let model_details = ModelConfig::new("does/not/exist.onnx".to_string(), InferenceDevice::CPU);

    let doctor = leaf_doctor::init_doctor(&model_details).unwrap();
    assert!(!doctor.is_model_loaded());

    let response = leaf_doctor::run_diagnosis(&doctor, &leaf_png(16, 16));
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Model not loaded"));
}
