use crossbeam_channel::{Receiver, Sender};

use crate::common::ClassificationResult;
use crate::errors::DiagnosisError;

pub type DiagnosisOutcome = Result<ClassificationResult, DiagnosisError>;

/// One image waiting for a worker, with the channel its answer goes back on.
#[derive(Debug)]
pub struct DiagnosisRequest {
    pub image_bytes: Vec<u8>,
    /// `(width, height)`; the doctor's configured size when `None`.
    pub target_size: Option<(u32, u32)>,
    pub reply_tx: Sender<DiagnosisOutcome>,
}

impl DiagnosisRequest {
    pub fn new(image_bytes: Vec<u8>, target_size: Option<(u32, u32)>) -> (Self, Receiver<DiagnosisOutcome>) {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let request = Self {
            image_bytes,
            target_size,
            reply_tx,
        };
        (request, reply_rx)
    }
}
