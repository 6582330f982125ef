//! Error types for the diagnosis pipeline.
//!
//! Image problems are the caller's to fix and map to client errors; scorer
//! problems are ours and map to server errors.

use thiserror::Error;

/// Failure to turn raw bytes into an [`ImageTensor`](crate::common::ImageTensor).
#[derive(Error, Debug)]
pub enum NormalizeError {
    /// The bytes are not an image in any supported encoding.
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// The image decoded but cannot be brought into a 3-channel tensor of the
    /// requested size.
    #[error("cannot convert image to a {width}x{height} RGB tensor: {reason}")]
    Format {
        width: u32,
        height: u32,
        reason: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl NormalizeError {
    pub(crate) fn format(width: u32, height: u32, reason: impl Into<String>) -> Self {
        NormalizeError::Format {
            width,
            height,
            reason: reason.into(),
            source: None,
        }
    }

    pub(crate) fn format_caused_by(
        width: u32,
        height: u32,
        reason: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        NormalizeError::Format {
            width,
            height,
            reason: reason.into(),
            source: Some(source.into()),
        }
    }
}

/// Terminal outcome of a failed diagnosis. No partial result accompanies it.
#[derive(Error, Debug)]
pub enum DiagnosisError {
    /// No scorer was loaded at startup.
    #[error("Model not loaded")]
    ModelUnavailable,

    #[error("Image preprocessing failed: {0}")]
    Preprocessing(#[from] NormalizeError),

    /// The scorer failed or produced output the pipeline cannot interpret.
    #[error("Prediction failed ({scorer}): {source:#}")]
    Inference {
        scorer: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DiagnosisError {
    pub(crate) fn inference(scorer: &str, source: impl Into<anyhow::Error>) -> Self {
        DiagnosisError::Inference {
            scorer: scorer.to_string(),
            source: source.into(),
        }
    }

    /// True when the request itself was bad (undecodable or unusable image).
    pub fn is_client_error(&self) -> bool {
        matches!(self, DiagnosisError::Preprocessing(_))
    }

    /// HTTP status the surrounding server layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            DiagnosisError::Preprocessing(_) => 400,
            DiagnosisError::ModelUnavailable => 503,
            DiagnosisError::Inference { .. } => 500,
        }
    }
}
