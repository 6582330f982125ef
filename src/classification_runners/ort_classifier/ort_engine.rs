//! ONNX Runtime backend: session construction, execution-provider selection
//! and input/output dtype alignment.

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use half::{bf16, f16};
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{
        CPUExecutionProvider, CUDAExecutionProvider, CoreMLExecutionProvider, ExecutionProvider,
        TensorRTExecutionProvider,
    },
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    tensor::TensorElementType,
    value::{DynValue, Tensor, ValueType},
};

use crate::common::{ImageTensor, InferenceDevice};
use crate::data::{ConfigOrt, TimeCalc, CROSS_MARK};

/// Memory order the model expects its image input in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TensorLayout {
    /// `(N, H, W, C)`, what Keras exports produce.
    Nhwc,
    /// `(N, C, H, W)`, what PyTorch exports produce.
    Nchw,
}

impl TensorLayout {
    /// Channels-first when dimension 1 holds the 3 colour channels and the
    /// last one does not. Dynamic dimensions are reported as `-1`.
    pub fn from_input_dims(dims: &[i64]) -> Self {
        if dims.len() == 4 && dims[1] == 3 && dims[3] != 3 {
            TensorLayout::Nchw
        } else {
            TensorLayout::Nhwc
        }
    }
}

/// Name, dtype and dimensions of one model input or output.
#[derive(Debug, Clone)]
pub struct OrtTensorAttr {
    pub name: String,
    pub dtype: TensorElementType,
    pub dims: Vec<i64>,
}

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_attr: OrtTensorAttr,
    output_attr: OrtTensorAttr,
    layout: TensorLayout,
    profile: bool,
    pub infer_time: TimeCalc,
}

impl OrtEngine {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        if config.onnx_path.is_empty() {
            anyhow::bail!("{CROSS_MARK} No ONNX model path configured");
        }
        if !Path::new(&config.onnx_path).is_file() {
            anyhow::bail!("{CROSS_MARK} ONNX model not found: {}", config.onnx_path);
        }

        // build
        let ort_init = match &config.ort_lib_path {
            Some(path) => ort::init_from(path),
            None => ort::init(),
        };
        if let Err(e) = ort_init.commit() {
            return Err(anyhow::anyhow!("Failed to commit ORT: {:?}", e));
        }

        let mut builder = Session::builder()?;

        let mut device = config.device.to_owned();
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(&mut builder, device_id, config.trt_fp16_enable, config.trt_engine_cache_enable)
                    .unwrap_or_else(|err| {
                        log::warn!("{err}, Using cpu");
                        device = InferenceDevice::CPU;
                    })
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CoreML(_) => Self::build_coreml(&mut builder).unwrap_or_else(|err| {
                log::warn!("{err}, Using cpu");
                device = InferenceDevice::CPU;
            }),
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        if let Some(n) = config.num_threads {
            builder = builder.with_intra_threads(n)?;
        }

        let session = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(&config.onnx_path)?;

        let input_attr = match session.inputs.first() {
            Some(input) => Self::tensor_attr(&input.name, &input.input_type)?,
            None => anyhow::bail!("{CROSS_MARK} Model {} declares no inputs", config.onnx_path),
        };
        let output_attr = match session.outputs.first() {
            Some(output) => Self::tensor_attr(&output.name, &output.output_type)?,
            None => anyhow::bail!("{CROSS_MARK} Model {} declares no outputs", config.onnx_path),
        };
        let layout = TensorLayout::from_input_dims(&input_attr.dims);

        // summary
        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} {:?} {:?} ({:?}) | Output: {} {:?}",
            device,
            input_attr.name,
            input_attr.dtype,
            input_attr.dims,
            layout,
            output_attr.name,
            output_attr.dims,
        );

        let engine = Self {
            session,
            device,
            input_attr,
            output_attr,
            layout,
            profile: config.profile,
            infer_time: TimeCalc::default(),
        };

        if let Some((height, width)) = engine.static_input_size() {
            if (width, height) != (config.model_width as usize, config.model_height as usize) {
                log::warn!(
                    "Model expects {}x{} inputs but the pipeline is configured for {}x{}",
                    width, height, config.model_width, config.model_height
                );
            }
        }

        Ok(engine)
    }

    fn tensor_attr(name: &str, value_type: &ValueType) -> Result<OrtTensorAttr> {
        let dtype = match value_type {
            ValueType::Tensor { ty, .. } => *ty,
            _ => anyhow::bail!("{CROSS_MARK} '{}' is not a tensor ({:?})", name, value_type),
        };
        let dims = value_type
            .tensor_shape()
            .map(|s| s.iter().copied().collect::<Vec<i64>>())
            .unwrap_or_default();

        Ok(OrtTensorAttr {
            name: name.to_string(),
            dtype,
            dims,
        })
    }

    fn build_trt(
        builder: &mut SessionBuilder,
        device_id: usize,
        fp16_enable: bool,
        engine_cache_enable: bool,
    ) -> Result<()> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(fp16_enable)
            .with_engine_cache(engine_cache_enable)
            .with_engine_cache_path("trt-cache")
            .with_timing_cache(false);
        if trt.is_available()? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} TensorRT initialization failed: {:?}", err) }
            }
            log::info!("🐢 Initial model serialization with TensorRT may takes some time...");
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} TensorRT execution provider not available")
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<()> {
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CUDA initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CUDA execution provider not available")
        }
    }

    fn build_coreml(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CoreMLExecutionProvider::default()
            .with_subgraphs(false);
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CoreML initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CoreML execution provider not available")
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<()> {
        let ep = CPUExecutionProvider::default();
        if ep.is_available()? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { anyhow::bail!("{CROSS_MARK} CPU initialization failed: {:?}", err) }
            }
            Ok(())
        } else {
            anyhow::bail!("{CROSS_MARK} CPU execution provider not available")
        }
    }

    fn tensor_preprocess(x: Array<f32, IxDyn>, dtype: &TensorElementType) -> Result<DynValue> {
        let x = match dtype {
            TensorElementType::Float32 => Tensor::from_array(x)?.into_dyn(),
            TensorElementType::Float64 => Tensor::from_array(x.mapv(|x_| x_ as f64))?.into_dyn(),
            TensorElementType::Float16 => Tensor::from_array(x.mapv(f16::from_f32))?.into_dyn(),
            TensorElementType::Bfloat16 => Tensor::from_array(x.mapv(bf16::from_f32))?.into_dyn(),
            // Quantized models take raw 0-255 pixels.
            TensorElementType::Uint8 => Tensor::from_array(x.mapv(|x_| (x_ * 255.).round() as u8))?.into_dyn(),
            _ => anyhow::bail!("Unsupported model input type: {:?}", dtype),
        };
        Ok(x)
    }

    fn tensor_postprocess(x: &DynValue, dtype: &TensorElementType) -> Result<Array<f32, IxDyn>> {
        fn _extract_and_convert<T>(x: &DynValue, map_fn: impl Fn(T) -> f32) -> Result<Array<f32, IxDyn>>
        where
            T: Clone + 'static + ort::tensor::PrimitiveTensorElementType,
        {
            let view = x.try_extract_array::<T>()?;
            Ok(view.mapv(map_fn).into_owned())
        }
        match dtype {
            TensorElementType::Float32 => _extract_and_convert::<f32>(x, |x| x),
            TensorElementType::Float16 => _extract_and_convert::<f16>(x, f16::to_f32),
            TensorElementType::Bfloat16 => _extract_and_convert::<bf16>(x, bf16::to_f32),
            TensorElementType::Float64 => _extract_and_convert::<f64>(x, |x| x as f32),
            _ => Err(anyhow::anyhow!("Unsupported ort tensor type: {:?}", dtype)),
        }
    }

    /// Runs one normalized image through the session and returns the first
    /// output as `f32`.
    pub fn run(&mut self, x: &ImageTensor) -> Result<Array<f32, IxDyn>> {
        // alignment
        let t_pre = Instant::now();
        let input = match self.layout {
            TensorLayout::Nhwc => x.0.clone(),
            TensorLayout::Nchw => x.to_nchw()?,
        };
        let xs_ = vec![Into::<SessionInputValue<'_>>::into(Self::tensor_preprocess(
            input,
            &self.input_attr.dtype,
        )?)];
        let t_pre = t_pre.elapsed();
        self.infer_time.add_or_push(0, t_pre);

        // inference
        let t_run = Instant::now();
        let outputs = self.session.run(&xs_[..])?;
        let t_run = t_run.elapsed();
        self.infer_time.add_or_push(1, t_run);

        // extract
        let t_post = Instant::now();
        let y = Self::tensor_postprocess(&outputs[self.output_attr.name.as_str()], &self.output_attr.dtype)?;
        let t_post = t_post.elapsed();
        self.infer_time.add_or_push(2, t_post);

        if self.profile {
            let len = 10usize;
            let n = 4usize;
            log::info!("[Profile] {:>len$.n$?} ({:>len$.n$?} avg) [alignment: {:>len$.n$?} ({:>len$.n$?} avg) | inference: {:>len$.n$?} ({:>len$.n$?} avg) | to_f32: {:>len$.n$?} ({:>len$.n$?} avg)]",
                t_pre + t_run + t_post,
                self.infer_time.avg(),
                t_pre,
                self.infer_time.avg_i(0),
                t_run,
                self.infer_time.avg_i(1),
                t_post,
                self.infer_time.avg_i(2),
            );
        }

        Ok(y)
    }

    /// `(height, width)` when the model declares a fixed input resolution.
    pub fn static_input_size(&self) -> Option<(usize, usize)> {
        let dims = &self.input_attr.dims;
        if dims.len() != 4 {
            return None;
        }
        let (h, w) = match self.layout {
            TensorLayout::Nhwc => (dims[1], dims[2]),
            TensorLayout::Nchw => (dims[2], dims[3]),
        };
        if h > 0 && w > 0 {
            Some((h as usize, w as usize))
        } else {
            None
        }
    }

    /// Class count, when the output's last dimension is fixed.
    pub fn output_width(&self) -> Option<usize> {
        match self.output_attr.dims.last() {
            Some(&n) if n > 0 => Some(n as usize),
            _ => None,
        }
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_from_dims() {
        assert_eq!(TensorLayout::from_input_dims(&[-1, 128, 128, 3]), TensorLayout::Nhwc);
        assert_eq!(TensorLayout::from_input_dims(&[1, 3, 224, 224]), TensorLayout::Nchw);
        assert_eq!(TensorLayout::from_input_dims(&[-1, -1, -1, 3]), TensorLayout::Nhwc);
        assert_eq!(TensorLayout::from_input_dims(&[-1, 3, -1, -1]), TensorLayout::Nchw);
        assert_eq!(TensorLayout::from_input_dims(&[]), TensorLayout::Nhwc);
    }
}
