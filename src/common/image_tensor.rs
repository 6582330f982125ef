//! Model input, wrapper over [`Array<f32, IxDyn>`].

use anyhow::{bail, Result};
use ndarray::{Array, IxDyn};

/// Normalized image batch of shape `(1, H, W, 3)` with values in `[0.0, 1.0]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageTensor(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for ImageTensor {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl std::ops::Deref for ImageTensor {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ImageTensor {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self> {
        Ok(Self::from(Array::from_shape_vec(shape, xs)?))
    }

    /// Zero-filled NHWC tensor, used for warm-up runs.
    pub fn zeros(height: u32, width: u32) -> Self {
        Self(Array::zeros(IxDyn(&[1, height as usize, width as usize, 3])))
    }

    pub fn ndim(&self) -> usize {
        self.0.ndim()
    }

    /// `(height, width)` of the image held by this tensor.
    pub fn spatial_dims(&self) -> (usize, usize) {
        let shape = self.0.shape();
        (shape[1], shape[2])
    }

    /// Channels-first copy, `(1, 3, H, W)`.
    pub fn to_nchw(&self) -> Result<Array<f32, IxDyn>> {
        if self.ndim() != 4 {
            bail!("Expected 4D tensor (NHWC), got ndim={}", self.ndim());
        }

        Ok(self
            .0
            .view()
            .permuted_axes(IxDyn(&[0, 3, 1, 2]))
            .as_standard_layout()
            .into_owned())
    }

    pub fn into_inner(self) -> Array<f32, IxDyn> {
        self.0
    }
}
