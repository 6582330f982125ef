use crate::common::{ImageTensor, ScoreVector};

/// An already-trained classifier: one score per class for one image tensor.
///
/// Implementations must be safe to call from several threads at once; the
/// pipeline holds a single instance for the life of the process.
pub trait Scorer: Send + Sync {
    fn score(&self, tensor: &ImageTensor) -> anyhow::Result<ScoreVector>;

    /// Number of scores the model emits, when it is known up front.
    fn output_width(&self) -> Option<usize> {
        None
    }

    fn name(&self) -> &str {
        "scorer"
    }
}

/// Plain functions and closures score too, which keeps fake classifiers in
/// tests to a single line.
impl<F> Scorer for F
where
    F: Fn(&ImageTensor) -> anyhow::Result<Vec<f32>> + Send + Sync,
{
    fn score(&self, tensor: &ImageTensor) -> anyhow::Result<ScoreVector> {
        self(tensor).map(ScoreVector::from)
    }

    fn name(&self) -> &str {
        "fn"
    }
}
