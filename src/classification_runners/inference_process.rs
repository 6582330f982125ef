use std::time::Instant;

use crate::common::{ImageTensor, ScoreVector};
use crate::errors::DiagnosisError;
use crate::utils;

pub trait InferenceProcess {
    type Output;

    /// Checks that the process can run at all, before any input is touched.
    fn ready(&self) -> Result<(), DiagnosisError>;

    /// Pre-process the input data.
    fn preprocess(&self, image_bytes: &[u8], target_size: (u32, u32)) -> Result<ImageTensor, DiagnosisError>;

    /// Executes the model on the preprocessed data.
    fn inference(&self, xs: ImageTensor) -> Result<ScoreVector, DiagnosisError>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: ScoreVector) -> Result<Self::Output, DiagnosisError>;

    /// Executes the full pipeline.
    fn run(&self, image_bytes: &[u8], target_size: (u32, u32)) -> Result<Self::Output, DiagnosisError> {
        self.ready()?;
        let xs = self.preprocess(image_bytes, target_size)?;
        let ys = self.inference(xs)?;
        self.postprocess(ys)
    }

    /// Executes the full pipeline, tracing the duration of each stage.
    fn forward(&self, image_bytes: &[u8], target_size: (u32, u32), profile: bool) -> Result<Self::Output, DiagnosisError> {
        let detect_time = Instant::now();
        self.ready()?;

        let t_pre = Instant::now();
        let xs = self.preprocess(image_bytes, target_size)?;
        let t_pre = t_pre.elapsed();

        let mut _detect_elapsed = detect_time.elapsed();
        _detect_elapsed = utils::trace("TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let t_exe = Instant::now();
        let ys = self.inference(xs)?;
        let t_exe = t_exe.elapsed();

        _detect_elapsed = utils::trace("TIME", "Classification run", detect_time, _detect_elapsed);

        let t_post = Instant::now();
        let output = self.postprocess(ys)?;
        let t_post = t_post.elapsed();

        utils::trace("TIME", "Postprocessing", detect_time, _detect_elapsed);

        if profile {
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok(output)
    }
}
