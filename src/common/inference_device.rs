use serde::{Deserialize, Serialize};

/// Execution provider the ONNX session is built for.
///
/// Serialized as `"cpu"` or `"<device>:<id>"`, e.g. `"cuda:0"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
    CoreML(usize),
}

// Hardcoded device names. Storing the "proper" spelling and the lowercase version.
const CPU: [&str; 2] = ["CPU", "cpu"];
const CUDA: [&str; 2] = ["CUDA", "cuda"];
const TENSOR_RT: [&str; 2] = ["TensorRT", "tensorrt"];
const CORE_ML: [&str; 2] = ["CoreML", "coreml"];

impl InferenceDevice {
    pub fn from_str(device: &str, device_id: usize) -> Option<Self> {
        match device.to_lowercase().as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" => Some(InferenceDevice::CUDA(device_id)),
            "tensorrt" => Some(InferenceDevice::TensorRT(device_id)),
            "coreml" => Some(InferenceDevice::CoreML(device_id)),
            _ => None,
        }
    }

    /// Parses `"cuda"`, `"cuda:1"`, `"CPU"` and friends.
    pub fn parse(spec: &str) -> Option<Self> {
        match spec.split_once(':') {
            Some((device, id)) => Self::from_str(device.trim(), id.trim().parse().ok()?),
            None => Self::from_str(spec.trim(), 0),
        }
    }

    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[0],
            InferenceDevice::CUDA(_) => CUDA[0],
            InferenceDevice::TensorRT(_) => TENSOR_RT[0],
            InferenceDevice::CoreML(_) => CORE_ML[0],
        }
    }

    pub fn str_lowercase(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => CPU[1],
            InferenceDevice::CUDA(_) => CUDA[1],
            InferenceDevice::TensorRT(_) => TENSOR_RT[1],
            InferenceDevice::CoreML(_) => CORE_ML[1],
        }
    }

    pub fn device_id(&self) -> usize {
        match self {
            InferenceDevice::CPU => 0,
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) | InferenceDevice::CoreML(id) => *id,
        }
    }

    pub fn all_inference_devices() -> Vec<String> {
        vec![
            InferenceDevice::CPU.str_lowercase().to_string(),
            InferenceDevice::CUDA(0).str_lowercase().to_string(),
            InferenceDevice::TensorRT(0).str_lowercase().to_string(),
            InferenceDevice::CoreML(0).str_lowercase().to_string(),
        ]
    }

    pub fn is_valid_inference_device(inference_device: &str) -> bool {
        InferenceDevice::parse(inference_device).is_some()
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceDevice::CPU => f.write_str(self.str()),
            _ => write!(f, "{}:{}", self.str(), self.device_id()),
        }
    }
}

impl From<InferenceDevice> for String {
    fn from(device: InferenceDevice) -> Self {
        match device {
            InferenceDevice::CPU => device.str_lowercase().to_string(),
            _ => format!("{}:{}", device.str_lowercase(), device.device_id()),
        }
    }
}

impl TryFrom<String> for InferenceDevice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        InferenceDevice::parse(&value).ok_or_else(|| {
            format!(
                "unknown inference device '{}', expected one of {:?}",
                value,
                InferenceDevice::all_inference_devices()
            )
        })
    }
}
