/// Raw classifier output, one score per vocabulary entry.
///
/// The values are treated as opaque probabilities: nothing here assumes they
/// sum to one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreVector(Vec<f32>);

impl From<Vec<f32>> for ScoreVector {
    fn from(scores: Vec<f32>) -> Self {
        Self(scores)
    }
}

impl std::ops::Deref for ScoreVector {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ScoreVector {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// Index of the first non-finite score, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|x| !x.is_finite())
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}
