extern crate leaf_doctor;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use leaf_doctor::common::{ClassVocabulary, ImageTensor, PlantDoctor, Severity};
use leaf_doctor::diagnosis::DiseaseCategory;
use leaf_doctor::{DiagnosisError, NormalizeError};


use fixtures::{init_logger, leaf_png, peaked_scores};

fn six_classes() -> ClassVocabulary {
    ClassVocabulary::new(
        [
            "Apple___Apple_scab",
            "Corn_(maize)___Common_rust_",
            "Grape___Black_rot",
            "Peach___Bacterial_spot",
            "Squash___Powdery_mildew",
            "Tomato___healthy",
        ]
        .iter()
        .map(|x| x.to_string())
        .collect(),
    )
}

fn strings(xs: &[&str]) -> Vec<String> {
    xs.iter().map(|x| x.to_string()).collect()
}

#[test]
fn healthy_strawberry() {
    init_logger();
    let vocabulary = ClassVocabulary::plant_village();
    let index = vocabulary.position("Strawberry___healthy").unwrap();
    let n = vocabulary.len();

    let scorer = move |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(peaked_scores(n, index, 0.92)) };
    let doctor = PlantDoctor::new(Arc::new(scorer), vocabulary);

    let report = doctor.infer(&leaf_png(300, 200)).unwrap();
    assert_eq!(report.crop(), "Strawberry");
    assert_eq!(report.disease(), "healthy");
    assert_eq!(report.severity(), Severity::Healthy);
    assert_eq!(report.confidence(), 92.0);
    assert_eq!(report.recommendations(), strings(DiseaseCategory::Healthy.advice()).as_slice());
    assert_eq!(report.class_name(), "Strawberry___healthy");
    assert_eq!(report.alternatives().len(), 5);
    assert_eq!(report.alternatives()[0].label, "Strawberry - healthy");
    assert_eq!(report.alternatives()[0].confidence, 92.0);
    assert!(report.is_healthy());
}

#[test]
fn built_in_ordinals_follow_training_order() {
    let cases = [
        (4, "Cherry (including sour)", "healthy"),
        (21, "Potato", "Late blight"),
        (25, "Strawberry", "healthy"),
        (36, "Tomato", "Tomato Yellow Leaf Curl Virus"),
        (37, "Blueberry", "healthy"),
    ];
    for (index, crop, disease) in cases {
        let scorer = move |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(peaked_scores(38, index, 0.9)) };
        let doctor = PlantDoctor::new(Arc::new(scorer), ClassVocabulary::plant_village());

        let report = doctor.infer(&leaf_png(32, 32)).unwrap();
        assert_eq!((report.crop(), report.disease()), (crop, disease), "ordinal {index}");
    }
}

#[test]
fn six_class_ranking() {
    init_logger();
    let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(vec![0.1, 0.7, 0.05, 0.05, 0.05, 0.05]) };
    let doctor = PlantDoctor::new(Arc::new(scorer), six_classes());

    let report = doctor.infer(&leaf_png(64, 64)).unwrap();
    assert_eq!(report.class_name(), "Corn_(maize)___Common_rust_");
    assert_eq!(report.crop(), "Corn (maize)");
    assert_eq!(report.disease(), "Common rust");
    assert_eq!(report.severity(), Severity::Medium);
    assert_eq!(report.confidence(), 70.0);
    assert_eq!(report.recommendations()[0], "Apply fungicide containing propiconazole");

    let labels = report.alternatives().iter().map(|a| a.label.as_str()).collect::<Vec<_>>();
    assert_eq!(
        labels,
        [
            "Corn (maize) - Common rust ",
            "Apple - Apple scab",
            "Grape - Black rot",
            "Peach - Bacterial spot",
            "Squash - Powdery mildew",
        ]
    );
    for pair in report.alternatives().windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }
}

#[test]
fn high_severity_blight_is_urgent() {
    let vocabulary = ClassVocabulary::plant_village();
    let index = vocabulary.position("Tomato___Late_blight").unwrap();
    let n = vocabulary.len();
    let scorer = move |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(peaked_scores(n, index, 0.95)) };
    let doctor = PlantDoctor::new(Arc::new(scorer), vocabulary);

    let report = doctor.infer(&leaf_png(32, 32)).unwrap();
    assert_eq!(report.severity(), Severity::High);
    assert_eq!(report.recommendations().len(), 6);
    assert_eq!(report.recommendations()[2], "Remove affected leaves and dispose properly");
}

#[test]
fn out_of_range_prediction_is_unknown() {
    let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(vec![0.0, 0.0, 0.1, 0.0, 0.0, 0.0, 0.9]) };
    let doctor = PlantDoctor::new(Arc::new(scorer), six_classes());

    let report = doctor.infer(&leaf_png(32, 32)).unwrap();
    assert_eq!(report.class_name(), "Unknown");
    assert_eq!(report.crop(), "Unknown");
    assert_eq!(report.disease(), "Unknown");
    assert_eq!(report.alternatives()[0].label, "Class_6");
    assert_eq!(report.alternatives()[1].label, "Grape - Black rot");
}

#[test]
fn unloaded_model_fails_before_decoding() {
    let doctor = PlantDoctor::unloaded(ClassVocabulary::default());
    assert!(!doctor.is_model_loaded());

    let err = doctor.infer(b"not an image").unwrap_err();
    assert!(matches!(err, DiagnosisError::ModelUnavailable));
    assert_eq!(err.status_code(), 503);
}

#[test]
fn undecodable_bytes_are_a_client_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let scorer = move |_: &ImageTensor| -> anyhow::Result<Vec<f32>> {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0])
    };
    let doctor = PlantDoctor::new(Arc::new(scorer), six_classes());

    let err = doctor.infer(b"\x89PNG garbage").unwrap_err();
    assert!(matches!(err, DiagnosisError::Preprocessing(NormalizeError::Decode(_))));
    assert!(err.is_client_error());
    assert!(err.to_string().starts_with("Image preprocessing failed: "));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scorer_failure_is_a_server_error() {
    let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { anyhow::bail!("CUDA out of memory") };
    let doctor = PlantDoctor::new(Arc::new(scorer), six_classes());

    let err = doctor.infer(&leaf_png(32, 32)).unwrap_err();
    assert!(matches!(err, DiagnosisError::Inference { .. }));
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("CUDA out of memory"));
}

#[test]
fn target_size_reaches_the_scorer() {
    let scorer = |x: &ImageTensor| -> anyhow::Result<Vec<f32>> {
        if x.shape() != [1, 64, 96, 3] {
            anyhow::bail!("unexpected input shape {:?}", x.shape());
        }
        Ok(vec![0.0, 0.0, 0.0, 0.0, 0.0, 1.0])
    };
    let doctor = PlantDoctor::new(Arc::new(scorer), six_classes());

    let report = doctor.infer_with_size(&leaf_png(500, 375), (96, 64)).unwrap();
    assert_eq!(report.crop(), "Tomato");
    assert!(doctor.infer(&leaf_png(500, 375)).is_err());
}

#[test]
fn batch_keeps_order_and_isolates_failures() {
    let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(vec![0.9, 0.02, 0.02, 0.02, 0.02, 0.02]) };
    let doctor = PlantDoctor::new(Arc::new(scorer), six_classes());

    let images = vec![leaf_png(32, 32), b"junk".to_vec(), leaf_png(10, 80)];
    let results = doctor.infer_batch(&images);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().crop(), "Apple");
    assert!(results[1].as_ref().unwrap_err().is_client_error());
    assert_eq!(results[2].as_ref().unwrap().disease(), "Apple scab");
}

#[test]
fn response_json_shape() {
    let vocabulary = ClassVocabulary::plant_village();
    let index = vocabulary.position("Strawberry___healthy").unwrap();
    let n = vocabulary.len();
    let scorer = move |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(peaked_scores(n, index, 0.92)) };
    let doctor = PlantDoctor::new(Arc::new(scorer), vocabulary);

    let json = leaf_doctor::run_diagnosis(&doctor, &leaf_png(48, 48)).to_json().unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["crop"], "Strawberry");
    assert_eq!(json["disease"], "healthy");
    assert_eq!(json["severity"], "Healthy");
    assert_eq!(json["confidence"], 92.0);
    assert_eq!(json["className"], "Strawberry___healthy");
    assert_eq!(json["recommendations"].as_array().unwrap().len(), 4);
    assert_eq!(json["all_predictions"][0]["class"], "Strawberry - healthy");
    assert_eq!(json["all_predictions"][0]["confidence"], 92.0);
    assert!(json.get("error").is_none());

    let json = leaf_doctor::run_diagnosis(&doctor, b"").to_json().unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().starts_with("Image preprocessing failed"));
    assert!(json.get("crop").is_none());
}
