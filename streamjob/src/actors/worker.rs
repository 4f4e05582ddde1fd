mod actor;
mod cleanup;

use super::relay::RelayHandle;
use crate::config::SupervisorConfig;
use crate::events::JobStatus;
use crate::sink::StatusTarget;
use crate::transcoder::Transcoder;
use crate::types::JobId;
use actor::Actor;
use cleanup::Cleanup;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time,
};
use tracing::warn;

/// What a worker is asked to stream.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub job_id: JobId,
    pub video: PathBuf,
    pub destination: String,
}

/// Registry-side handle of one running worker.
///
/// Dropping the handle drops the cancel sender, which the worker treats as a cancel request.
pub struct WorkerHandle {
    cancel: watch::Sender<bool>,
    status: watch::Receiver<JobStatus>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn the worker and its status relay.
    ///
    /// `exit_tx` receives the job id once, when the worker has cleaned up.
    pub fn spawn(
        spec: JobSpec,
        target: StatusTarget,
        transcoder: Arc<dyn Transcoder>,
        config: &SupervisorConfig,
        exit_tx: mpsc::UnboundedSender<JobId>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (cancel, cancel_rx) = watch::channel(false);
        let (status_tx, status) = watch::channel(JobStatus::Starting);

        let relay = RelayHandle::spawn(spec.job_id, events_rx, target, config.poll_interval);
        let cleanup = Cleanup::new(
            spec.job_id,
            spec.video.clone(),
            status_tx,
            events_tx.clone(),
            exit_tx,
            relay,
        );
        let task = Actor::spawn(
            spec,
            transcoder,
            config.settings.clone(),
            config.progress_interval,
            events_tx,
            cancel_rx,
            cleanup,
        );
        Self {
            cancel,
            status,
            task,
        }
    }

    pub fn status(&self) -> JobStatus {
        *self.status.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<JobStatus> {
        self.status.clone()
    }

    /// Raise the cancel signal and wait up to `wait` for the worker to exit.
    ///
    /// Returns whether it exited in time. A worker that did not is aborted, which drops (and so kills)
    /// its transcoder process and runs its cleanup.
    pub async fn cancel(mut self, job_id: JobId, wait: Duration) -> bool {
        let _ = self.cancel.send(true);
        match time::timeout(wait, &mut self.task).await {
            Ok(_) => true,
            Err(_) => {
                warn!(%job_id, ?wait, "worker ignored cancel, aborting it");
                self.task.abort();
                false
            }
        }
    }
}
