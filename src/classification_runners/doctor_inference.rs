use crate::classification_runners::image_ops;
use crate::classification_runners::inference_process::InferenceProcess;
use crate::common::{
    AlternativePrediction, ClassificationResult, ImageTensor, PlantDoctor, ScoreVector, Severity,
};
use crate::diagnosis::{label_codec, ranking, recommendations};
use crate::errors::DiagnosisError;

impl InferenceProcess for PlantDoctor {
    type Output = ClassificationResult;

    fn ready(&self) -> Result<(), DiagnosisError> {
        match self.scorer {
            Some(_) => Ok(()),
            None => Err(DiagnosisError::ModelUnavailable),
        }
    }

    fn preprocess(&self, image_bytes: &[u8], target_size: (u32, u32)) -> Result<ImageTensor, DiagnosisError> {
        Ok(image_ops::normalize(image_bytes, target_size, self.resize_filter)?)
    }

    fn inference(&self, xs: ImageTensor) -> Result<ScoreVector, DiagnosisError> {
        let scorer = self.scorer.as_ref().ok_or(DiagnosisError::ModelUnavailable)?;

        let ys = scorer
            .score(&xs)
            .map_err(|err| DiagnosisError::inference(scorer.name(), err))?;

        if ys.is_empty() {
            return Err(DiagnosisError::inference(
                scorer.name(),
                anyhow::anyhow!("classifier returned no scores"),
            ));
        }
        if let Some(i) = ys.first_non_finite() {
            return Err(DiagnosisError::inference(
                scorer.name(),
                anyhow::anyhow!("classifier returned non-finite score {} at index {}", ys[i], i),
            ));
        }

        Ok(ys)
    }

    fn postprocess(&self, ys: ScoreVector) -> Result<Self::Output, DiagnosisError> {
        let (index, score) = match ranking::top1(&ys) {
            Some(top) => top,
            None => {
                return Err(DiagnosisError::inference(
                    "postprocess",
                    anyhow::anyhow!("no scores to rank"),
                ))
            }
        };

        let class_name = self.vocabulary.label_or_unknown(index).to_string();
        let (crop, disease) = label_codec::decode(&class_name);
        let severity = Severity::classify(score, &disease);
        let advice = recommendations::recommend(&crop, &disease, severity);

        let alternatives = ranking::top_k(&ys, ranking::TOP_K)
            .into_iter()
            .map(|(i, s)| {
                let label = match self.vocabulary.get(i) {
                    Some(name) => label_codec::display_label(name),
                    None => format!("Class_{i}"),
                };
                AlternativePrediction::new(label, ranking::to_percent(s))
            })
            .collect::<Vec<_>>();

        log::debug!("Top-1 {} ({}) -> {} / {} [{}]", index, score, crop, disease, severity);

        Ok(ClassificationResult::new(
            crop,
            disease,
            severity,
            ranking::to_percent(score),
            advice,
            alternatives,
            class_name,
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::common::ClassVocabulary;

    fn vocabulary() -> ClassVocabulary {
        ClassVocabulary::new(
            ["Apple___Apple_scab", "Apple___healthy", "Tomato___Late_blight"]
                .iter()
                .map(|x| x.to_string())
                .collect(),
        )
    }

    fn leaf_png() -> Vec<u8> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(24, 24, image::Rgb([30, 140, 40])))
            .write_to(&mut out, image::ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    #[test]
    fn run_and_forward_agree() {
        let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(vec![0.7, 0.2, 0.1]) };
        let doctor = PlantDoctor::new(Arc::new(scorer), vocabulary());

        let ran = doctor.run(&leaf_png(), (32, 32)).unwrap();
        let forwarded = doctor.forward(&leaf_png(), (32, 32), true).unwrap();
        assert_eq!(ran, forwarded);
        assert_eq!(ran.class_name(), "Apple___Apple_scab");
        assert_eq!(ran.severity(), Severity::Medium);

        let unloaded = PlantDoctor::unloaded(vocabulary());
        assert!(matches!(unloaded.run(&leaf_png(), (32, 32)), Err(DiagnosisError::ModelUnavailable)));
    }

    #[test]
    fn unloaded_doctor_is_not_ready() {
        let doctor = PlantDoctor::unloaded(vocabulary());
        assert!(matches!(doctor.ready(), Err(DiagnosisError::ModelUnavailable)));
    }

    #[test]
    fn non_finite_scores_are_rejected() {
        let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(vec![0.2, f32::NAN, 0.1]) };
        let doctor = PlantDoctor::new(Arc::new(scorer), vocabulary());
        let err = doctor.inference(ImageTensor::zeros(4, 4)).unwrap_err();
        assert!(matches!(err, DiagnosisError::Inference { .. }));
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn empty_scores_are_rejected() {
        let scorer = |_: &ImageTensor| -> anyhow::Result<Vec<f32>> { Ok(vec![]) };
        let doctor = PlantDoctor::new(Arc::new(scorer), vocabulary());
        assert!(doctor.inference(ImageTensor::zeros(4, 4)).is_err());
    }

    #[test]
    fn postprocess_builds_report() {
        let doctor = PlantDoctor::unloaded(vocabulary());
        let report = doctor
            .postprocess(ScoreVector::new(vec![0.05, 0.1, 0.85]))
            .unwrap();

        assert_eq!(report.crop(), "Tomato");
        assert_eq!(report.disease(), "Late blight");
        assert_eq!(report.severity(), Severity::High);
        assert_eq!(report.confidence(), 85.0);
        assert_eq!(report.class_name(), "Tomato___Late_blight");
        assert_eq!(report.recommendations().len(), 6);

        let labels = report.alternatives().iter().map(|a| a.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["Tomato - Late blight", "Apple - healthy", "Apple - Apple scab"]);
    }

    #[test]
    fn out_of_range_alternatives_use_index_label() {
        let doctor = PlantDoctor::unloaded(vocabulary());
        let report = doctor
            .postprocess(ScoreVector::new(vec![0.1, 0.1, 0.1, 0.7]))
            .unwrap();

        assert_eq!(report.class_name(), "Unknown");
        assert_eq!(report.crop(), "Unknown");
        assert_eq!(report.disease(), "Unknown");
        assert_eq!(report.alternatives()[0].label, "Class_3");
    }
}
