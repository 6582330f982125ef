//! Options for building the ONNX Runtime session.

use anyhow::Result;

use crate::common::{InferenceDevice, ModelConfig};

#[derive(Debug, Clone)]
pub struct ConfigOrt {
    pub onnx_path: String,
    pub ort_lib_path: Option<String>,
    pub device: InferenceDevice,
    pub model_width: u32,
    pub model_height: u32,
    pub num_threads: Option<usize>,
    pub profile: bool,
    pub num_dry_run: usize,

    // trt related
    pub trt_engine_cache_enable: bool,
    pub trt_fp16_enable: bool,

    pub names: Option<Vec<String>>,
}

impl Default for ConfigOrt {
    fn default() -> Self {
        Self {
            onnx_path: String::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            model_width: 128,
            model_height: 128,
            num_threads: None,
            profile: false,
            num_dry_run: 1,

            trt_engine_cache_enable: true,
            trt_fp16_enable: false,

            names: None,
        }
    }
}

impl TryFrom<&ModelConfig> for ConfigOrt {
    type Error = anyhow::Error;

    fn try_from(config: &ModelConfig) -> Result<Self> {
        let mut options = ConfigOrt::new()
            .with_model(&config.weights_path)?
            .with_device(config.inference_device)
            .with_model_width(config.width)
            .with_model_height(config.height)
            .with_dry_run(config.num_dry_run)
            .with_trt_fp16(config.trt_fp16)
            .with_trt_engine_cache(config.trt_engine_cache)
            .with_profile(config.profile);
        if let Some(path) = &config.ort_lib_path {
            options = options.with_ort_lib_path(path);
        }
        if let Some(n) = config.num_threads {
            options = options.with_num_threads(n);
        }
        Ok(options)
    }
}

impl ConfigOrt {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model(mut self, onnx_path: &str) -> Result<Self> {
        if onnx_path.is_empty() {
            anyhow::bail!("No model path given");
        }
        self.onnx_path = onnx_path.to_string();
        Ok(self)
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = Some(ort_lib_path.to_string());
        self
    }

    pub fn with_model_width(mut self, n: u32) -> Self {
        self.model_width = n;
        self
    }

    pub fn with_model_height(mut self, n: u32) -> Self {
        self.model_height = n;
        self
    }

    pub fn with_dry_run(mut self, n: usize) -> Self {
        self.num_dry_run = n;
        self
    }

    pub fn with_device(mut self, device_type: InferenceDevice) -> Self {
        self.device = device_type;
        self
    }

    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    pub fn with_trt_fp16(mut self, x: bool) -> Self {
        self.trt_fp16_enable = x;
        self
    }

    pub fn with_trt_engine_cache(mut self, x: bool) -> Self {
        self.trt_engine_cache_enable = x;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = Some(names.iter().map(|x| x.to_string()).collect::<Vec<String>>());
        self
    }
}
