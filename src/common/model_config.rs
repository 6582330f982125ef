use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::common::{ClassVocabulary, InferenceDevice};
use crate::data::ResizeFilter;

pub const DEFAULT_INPUT_SIZE: u32 = 128;

/// Startup configuration for the scorer and the pipeline around it.
///
/// Every field has a default, so a JSON file only needs to name the model:
/// `{"weights_path": "models/plant_disease.onnx"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights_path: String,
    /// Path to `libonnxruntime`; the default search path is used when unset.
    pub ort_lib_path: Option<String>,
    /// One class name per line. Falls back to model metadata, then to the
    /// built-in PlantVillage list.
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub width: u32,
    pub height: u32,
    pub resize_filter: ResizeFilter,
    pub num_threads: Option<usize>,
    pub num_dry_run: usize,
    pub profile: bool,
    /// TensorRT only.
    pub trt_fp16: bool,
    pub trt_engine_cache: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            ort_lib_path: None,
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
            resize_filter: ResizeFilter::default(),
            num_threads: None,
            num_dry_run: 1,
            profile: false,
            trt_fp16: false,
            trt_engine_cache: true,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: String, inference_device: InferenceDevice) -> Self {
        Self {
            weights_path,
            inference_device,
            ..Default::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read model config {:?}", path.as_ref()))?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw).context("Invalid model config")?;
        if config.width == 0 || config.height == 0 {
            anyhow::bail!("Model input resolution must be non-zero, got {}x{}", config.width, config.height);
        }
        Ok(config)
    }

    pub fn set_device_type(&mut self, device_type: InferenceDevice) {
        self.inference_device = device_type;
    }

    /// `(width, height)` the normalizer resizes to.
    pub fn target_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Vocabulary from `labels_path`, or `None` when no labels file is set.
    pub fn load_labels(&self) -> Result<Option<ClassVocabulary>> {
        match &self.labels_path {
            Some(path) => Ok(Some(ClassVocabulary::from_file(path)?)),
            None => Ok(None),
        }
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Resize Filter: {:?}",
               self.weights_path,
               self.labels_path.as_deref().unwrap_or("<built-in>"),
               self.ort_lib_path.as_deref().unwrap_or("<default>"),
               self.inference_device, self.width, self.height, self.resize_filter)
    }
}
