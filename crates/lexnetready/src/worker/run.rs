use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver};
use log::{debug, error, info};

use crate::batch::Batch;
use crate::error::{Result, WorkerError};
use crate::pipeline::{ChannelProgress, Pipeline, RunEvent, RunSummary};

/// The batch handed back by a finished run, with the run's result.
pub struct RunOutput {
    pub batch: Batch,
    pub result: Result<RunSummary>,
}

/// A run executing on its own worker thread.
///
/// The worker owns the batch until [`RunHandle::join`] returns it, so the
/// batch cannot be edited or run a second time while this run is active.
pub struct RunHandle {
    events: Receiver<RunEvent>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<RunOutput>,
}

impl RunHandle {
    /// Log lines and progress, ending with [`RunEvent::Finished`] on runs
    /// that got past setup.
    pub fn events(&self) -> &Receiver<RunEvent> {
        &self.events
    }

    /// Shared flag that stops the run before the next document once set.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn join(self) -> std::result::Result<RunOutput, WorkerError> {
        self.handle.join().map_err(|e| {
            error!("Run worker panicked: {:?}", e);
            WorkerError::Panicked
        })
    }
}

/// Moves `batch` onto a dedicated worker thread and starts the run there.
pub fn spawn_run(pipeline: Pipeline, mut batch: Batch) -> std::result::Result<RunHandle, WorkerError> {
    let (event_sender, events) = unbounded::<RunEvent>();
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);

    let handle = thread::Builder::new()
        .name("lexnetready-run".to_string())
        .spawn(move || {
            debug!("Run worker started with {} documents", batch.len());
            let progress = ChannelProgress::new(event_sender);
            let result = pipeline.run(&mut batch, &progress, &cancel_flag);

            match &result {
                Ok(summary) if summary.cancelled => info!("Run {} cancelled", summary.run_id),
                Ok(summary) => info!("Run {} finished", summary.run_id),
                Err(e) => error!("Run aborted: {}", e),
            }

            RunOutput { batch, result }
        })
        .map_err(|e| WorkerError::SpawnFailed(e.to_string()))?;

    Ok(RunHandle {
        events,
        cancel,
        handle,
    })
}
