//! Background recognition worker
//!
//! Runs the recognition adapter on its own thread so the UI stays responsive.
//! Outcomes go back over a channel and are applied on the UI thread.

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, info};

use super::{EngineFactory, RecognitionAdapter, RecognitionError};
use crate::shared::{RecognitionJob, RecognitionOutcome};

/// Handle to the recognition thread
pub struct RecognitionWorker {
    jobs: Sender<RecognitionJob>,
    outcomes: Receiver<RecognitionOutcome>,
    // Never joined: a hung engine must not block shutdown
    _handle: JoinHandle<()>,
}

impl RecognitionWorker {
    /// Start the worker thread.
    ///
    /// `notify` runs after every outcome is sent, e.g. to wake the UI.
    pub fn spawn<N>(factory: EngineFactory, max_image_dimension: u32, notify: N) -> Result<Self>
    where
        N: Fn() + Send + 'static,
    {
        let (job_tx, job_rx) = crossbeam_channel::unbounded::<RecognitionJob>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded::<RecognitionOutcome>();

        let handle = std::thread::Builder::new()
            .name("recognition".to_string())
            .spawn(move || {
                let mut adapter = RecognitionAdapter::new(factory, max_image_dimension);
                run(&mut adapter, &job_rx, &outcome_tx, &notify);
            })
            .context("Failed to spawn recognition worker")?;

        Ok(Self {
            jobs: job_tx,
            outcomes: outcome_rx,
            _handle: handle,
        })
    }

    /// Queue a job; fire-and-forget
    pub fn submit(&self, job: RecognitionJob) -> Result<(), RecognitionError> {
        let id = job.id;
        self.jobs.send(job).map_err(|_| {
            RecognitionError::Invocation("recognition worker is not running".to_string())
        })?;
        debug!("Submitted recognition job {}", id);
        Ok(())
    }

    /// Next finished outcome, if any, without blocking
    pub fn try_recv(&self) -> Option<RecognitionOutcome> {
        self.outcomes.try_recv().ok()
    }

    #[cfg(test)]
    fn recv_timeout(&self, timeout: std::time::Duration) -> Option<RecognitionOutcome> {
        self.outcomes.recv_timeout(timeout).ok()
    }
}

/// Worker loop; ends when the UI drops its job sender
fn run<N: Fn()>(
    adapter: &mut RecognitionAdapter,
    jobs: &Receiver<RecognitionJob>,
    outcomes: &Sender<RecognitionOutcome>,
    notify: &N,
) {
    while let Ok(mut job) = jobs.recv() {
        // Only the newest queued selection is worth recognizing
        while let Ok(newer) = jobs.try_recv() {
            debug!("Skipping superseded job {}", job.id);
            job = newer;
        }

        let start = Instant::now();
        let result = adapter.recognize_text(&job.bitmap);
        let elapsed = start.elapsed();

        let outcome = RecognitionOutcome {
            id: job.id,
            result,
            elapsed,
        };

        if outcomes.send(outcome).is_err() {
            break;
        }
        notify();
    }

    info!("Recognition worker stopped");
}
