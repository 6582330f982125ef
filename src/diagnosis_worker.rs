use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};

use crate::common::{ClassificationResult, PlantDoctor};
use crate::data::send_channels::{DiagnosisOutcome, DiagnosisRequest};
use crate::errors::DiagnosisError;

/// Fixed pool of threads sharing one [`PlantDoctor`], fed through a channel.
///
/// Workers exit once every request sender (the pool's own and any obtained
/// from [`DiagnosisWorker::sender`]) has been dropped.
#[derive(Debug)]
pub struct DiagnosisWorker {
    request_tx: Sender<DiagnosisRequest>,
    handles: Vec<JoinHandle<()>>,
}

impl DiagnosisWorker {
    pub fn spawn(doctor: Arc<PlantDoctor>, n_workers: usize) -> Result<Self> {
        if n_workers == 0 {
            anyhow::bail!("A diagnosis worker pool needs at least one worker");
        }

        let (request_tx, request_rx) = crossbeam_channel::unbounded::<DiagnosisRequest>();
        let mut handles = Vec::with_capacity(n_workers);
        for i in 0..n_workers {
            let doctor = Arc::clone(&doctor);
            let request_rx = request_rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("diagnosis-{i}"))
                .spawn(move || diagnosis_loop(i, doctor, request_rx))?;
            handles.push(handle);
        }
        log::info!("Started {n_workers} diagnosis worker(s)");

        Ok(Self { request_tx, handles })
    }

    pub fn sender(&self) -> Sender<DiagnosisRequest> {
        self.request_tx.clone()
    }

    /// Queues an image and returns the channel its result arrives on.
    pub fn submit(&self, image_bytes: Vec<u8>, target_size: Option<(u32, u32)>) -> Receiver<DiagnosisOutcome> {
        let (request, reply_rx) = DiagnosisRequest::new(image_bytes, target_size);
        if let Err(err) = self.request_tx.send(request) {
            log::error!("leaf_doctor: Failed to queue image: {}", err);
        }
        reply_rx
    }

    /// Queues an image and blocks until a worker answers.
    pub fn diagnose(&self, image_bytes: Vec<u8>) -> Result<ClassificationResult, DiagnosisError> {
        match self.submit(image_bytes, None).recv() {
            Ok(outcome) => outcome,
            Err(err) => Err(DiagnosisError::inference("worker", err)),
        }
    }

    pub fn n_workers(&self) -> usize {
        self.handles.len()
    }

    /// Stops accepting requests and waits for queued ones to finish.
    pub fn shutdown(self) {
        let Self { request_tx, handles } = self;
        drop(request_tx);
        for handle in handles {
            if handle.join().is_err() {
                log::error!("leaf_doctor: A diagnosis worker panicked");
            }
        }
    }
}

fn diagnosis_loop(worker_id: usize, doctor: Arc<PlantDoctor>, request_rx: Receiver<DiagnosisRequest>) {
    // MESSAGE LOOP STARTS HERE
    while let Ok(request) = request_rx.recv() {
        let diagnose_time = Instant::now();

        let outcome = match request.target_size {
            Some(target_size) => doctor.infer_with_size(&request.image_bytes, target_size),
            None => doctor.infer(&request.image_bytes),
        };
        if let Err(err) = &outcome {
            log::warn!("Worker {worker_id}: diagnosis failed: {err}");
        }
        log::trace!("Worker {worker_id}: processed in {:.2?}", diagnose_time.elapsed());

        if request.reply_tx.send(outcome).is_err() {
            log::warn!("Worker {worker_id}: requester went away before the reply");
        }
    }
    log::debug!("Worker {worker_id}: request channel closed, exiting");
}
