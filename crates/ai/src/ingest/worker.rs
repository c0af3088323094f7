//! Background worker running queued ingest jobs one at a time.

use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;

use vtt_core::ingest::IngestServiceTrait;

/// Sender side of the ingest job queue.
#[derive(Clone)]
pub struct IngestQueue {
    tx: mpsc::UnboundedSender<String>,
}

impl IngestQueue {
    /// Schedules `job_id`; dropped with a warning once the worker has stopped.
    pub fn enqueue(&self, job_id: impl Into<String>) {
        let job_id = job_id.into();
        if self.tx.send(job_id.clone()).is_err() {
            warn!("Ingest worker is not running; job {} was not queued", job_id);
        }
    }
}

/// Spawns the worker and returns the queue feeding it.
///
/// Jobs run serially in the order they were queued. The worker stops when
/// every `IngestQueue` clone is dropped.
pub fn spawn_ingest_worker(service: Arc<dyn IngestServiceTrait>) -> IngestQueue {
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    tokio::spawn(async move {
        while let Some(job_id) = rx.recv().await {
            match service.process_job(&job_id).await {
                Ok(job) => info!("Ingest job {} finished as {}", job_id, job.status),
                Err(e) => error!("Ingest job {} failed: {}", job_id, e),
            }
        }
        info!("Ingest worker stopped");
    });

    IngestQueue { tx }
}
