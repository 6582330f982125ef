use anyhow::Result;
use parking_lot::Mutex;

use crate::classification_runners::scorer::Scorer;
use crate::common::{ClassVocabulary, ImageTensor, ScoreVector};
use crate::data::ConfigOrt;

use super::ort_engine::OrtEngine;

/// [`Scorer`] backed by an ONNX Runtime session.
///
/// The session needs exclusive access while running, so concurrent callers
/// are serialized on an internal lock.
#[derive(Debug)]
pub struct OrtScorer {
    engine: Mutex<OrtEngine>,
    name: String,
    output_width: Option<usize>,
    target_size: (u32, u32),
    names: Option<Vec<String>>,
}

impl OrtScorer {
    pub fn new(config: &ConfigOrt) -> Result<Self> {
        let engine = OrtEngine::new(config)?;
        let output_width = engine.output_width();
        let name = format!("ort:{}", engine.device());

        let scorer = Self {
            engine: Mutex::new(engine),
            name,
            output_width,
            target_size: (config.model_width, config.model_height),
            names: config.names.clone(),
        };
        scorer.dry_run(config.num_dry_run)?;

        Ok(scorer)
    }

    /// Warms the session up with blank images so the first real request does
    /// not pay for lazy allocations.
    pub fn dry_run(&self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        let (width, height) = self.target_size;
        let x = ImageTensor::zeros(height, width);
        let mut engine = self.engine.lock();
        for _ in 0..n {
            engine.run(&x)?;
        }
        engine.infer_time.clear();
        log::info!("Dry run of {} finished ({n} pass(es))", self.name);
        Ok(())
    }

    /// Class names given in the options, else those embedded in the model
    /// metadata, if any.
    pub fn embedded_vocabulary(&self) -> Option<ClassVocabulary> {
        if let Some(names) = &self.names {
            return Some(ClassVocabulary::new(names.clone()));
        }
        let names = self.engine.lock().try_fetch("names")?;
        ClassVocabulary::from_model_metadata(&names)
    }
}

impl Scorer for OrtScorer {
    fn score(&self, x: &ImageTensor) -> Result<ScoreVector> {
        let y = self.engine.lock().run(x)?;

        let shape = y.shape();
        if shape.len() > 1 && shape[0] != 1 {
            anyhow::bail!("Expected a single score row, model returned shape {:?}", shape);
        }

        Ok(ScoreVector::new(y.iter().copied().collect()))
    }

    fn output_width(&self) -> Option<usize> {
        self.output_width
    }

    fn name(&self) -> &str {
        &self.name
    }
}
