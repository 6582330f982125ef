use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;

use crate::classification_runners::inference_process::InferenceProcess;
use crate::classification_runners::scorer::Scorer;
use crate::common::{ClassVocabulary, ClassificationResult, ModelConfig, DEFAULT_INPUT_SIZE};
use crate::data::ResizeFilter;
use crate::errors::DiagnosisError;

/// The loaded classifier together with everything needed to turn its output
/// into a [`ClassificationResult`].
///
/// Built once at startup and never mutated afterwards. Share it between
/// threads through an [`Arc`].
pub struct PlantDoctor {
    pub(crate) scorer: Option<Arc<dyn Scorer>>,
    pub(crate) vocabulary: ClassVocabulary,
    pub(crate) target_size: (u32, u32),
    pub(crate) resize_filter: ResizeFilter,
    pub(crate) profile: bool,
}

impl std::fmt::Debug for PlantDoctor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlantDoctor")
            .field("scorer", &self.scorer.as_ref().map(|s| s.name().to_string()))
            .field("classes", &self.vocabulary.len())
            .field("target_size", &self.target_size)
            .field("resize_filter", &self.resize_filter)
            .field("profile", &self.profile)
            .finish()
    }
}

impl PlantDoctor {
    pub fn new(scorer: Arc<dyn Scorer>, vocabulary: ClassVocabulary) -> Self {
        if let Some(width) = scorer.output_width() {
            vocabulary.check_width(width);
        }
        Self {
            scorer: Some(scorer),
            vocabulary,
            target_size: (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE),
            resize_filter: ResizeFilter::default(),
            profile: false,
        }
    }

    /// A doctor with no classifier. Every request fails with
    /// [`DiagnosisError::ModelUnavailable`].
    pub fn unloaded(vocabulary: ClassVocabulary) -> Self {
        Self {
            scorer: None,
            vocabulary,
            target_size: (DEFAULT_INPUT_SIZE, DEFAULT_INPUT_SIZE),
            resize_filter: ResizeFilter::default(),
            profile: false,
        }
    }

    /// Loads the ONNX model named by `config`.
    ///
    /// Class names come from `labels_path` when set, then from the model's
    /// `names` metadata, then from the built-in PlantVillage list. A model
    /// that fails to load leaves the doctor unloaded rather than failing
    /// startup; a labels file that cannot be read is an error.
    pub fn from_model_config(config: &ModelConfig) -> Result<Self> {
        let labels = config.load_labels()?;

        let doctor = match crate::load_scorer(config) {
            Ok(scorer) => {
                let vocabulary = labels
                    .or_else(|| scorer.embedded_vocabulary())
                    .unwrap_or_default();
                log::info!("Loaded {} with {} classes", config.weights_path, vocabulary.len());
                Self::new(Arc::new(scorer), vocabulary)
            }
            Err(err) => {
                log::error!("Failed to load model {}: {:#}", config.weights_path, err);
                Self::unloaded(labels.unwrap_or_default())
            }
        };

        Ok(doctor
            .with_target_size(config.target_size())
            .with_resize_filter(config.resize_filter)
            .with_profile(config.profile))
    }

    pub fn with_target_size(mut self, target_size: (u32, u32)) -> Self {
        self.target_size = target_size;
        self
    }

    pub fn with_resize_filter(mut self, resize_filter: ResizeFilter) -> Self {
        self.resize_filter = resize_filter;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn is_model_loaded(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn vocabulary(&self) -> &ClassVocabulary {
        &self.vocabulary
    }

    pub fn target_size(&self) -> (u32, u32) {
        self.target_size
    }

    /// Diagnoses one image at the configured resolution.
    pub fn infer(&self, image_bytes: &[u8]) -> Result<ClassificationResult, DiagnosisError> {
        self.infer_with_size(image_bytes, self.target_size)
    }

    pub fn infer_with_size(
        &self,
        image_bytes: &[u8],
        target_size: (u32, u32),
    ) -> Result<ClassificationResult, DiagnosisError> {
        self.forward(image_bytes, target_size, self.profile)
    }

    /// Diagnoses every image independently, in parallel. Results keep the
    /// input order and one failure does not affect the others.
    pub fn infer_batch<B>(&self, images: &[B]) -> Vec<Result<ClassificationResult, DiagnosisError>>
    where
        B: AsRef<[u8]> + Sync,
    {
        images
            .par_iter()
            .map(|image_bytes| self.infer(image_bytes.as_ref()))
            .collect()
    }

    /// Runs [`PlantDoctor::infer`] on tokio's blocking pool.
    pub async fn infer_async(
        self: Arc<Self>,
        image_bytes: Vec<u8>,
    ) -> Result<ClassificationResult, DiagnosisError> {
        match tokio::task::spawn_blocking(move || self.infer(&image_bytes)).await {
            Ok(outcome) => outcome,
            Err(err) => Err(DiagnosisError::inference("blocking task", err)),
        }
    }
}
