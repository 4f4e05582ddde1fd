mod actor;
mod messages;

use self::{
    actor::StreamSupervisor,
    messages::SupervisorMessage::{self, CancelJob, GetStatus, ListJobs, StartJob, WatchStatus},
};
use crate::config::SupervisorConfig;
use crate::errors::{self, JobError};
use crate::events::JobStatus;
use crate::sink::StatusTarget;
use crate::transcoder::Transcoder;
use crate::types::JobId;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::{mpsc, oneshot, watch};

/// A `StreamSupervisor` which starts, tracks and cancels stream jobs.
///
/// This struct is actually an actor handle, the real work is done in the actor spawned by
/// `StreamSupervisorHandle::spawn`, which owns the job registry. The handle can be cloned freely across
/// tasks without an `Arc<Mutex>`. Once every clone is dropped the actor cancels what is still running and exits.
#[derive(Clone)]
pub struct StreamSupervisorHandle {
    sender: mpsc::Sender<SupervisorMessage>,
}

impl StreamSupervisorHandle {
    /// Spawn a new supervisor. Must be called from within a tokio runtime.
    pub fn spawn(config: SupervisorConfig, transcoder: Arc<dyn Transcoder>) -> Self {
        let (sender, receiver) = mpsc::channel(config.mailbox_capacity.max(1));
        StreamSupervisor::spawn(receiver, transcoder, config);
        Self { sender }
    }

    /// Start streaming `video` to `destination` in the background.
    ///
    /// Returns as soon as the job is registered. The video file belongs to the job from here on and
    /// is deleted when the job ends.
    pub async fn start(
        &self,
        video: impl Into<PathBuf>,
        destination: impl Into<String>,
        target: StatusTarget,
    ) -> errors::Result<JobId> {
        let video = video.into();
        let destination = destination.into();
        self.request(|response| StartJob {
            video,
            destination,
            target,
            response,
        })
        .await
    }

    /// Cancel a job. Resolves to whether its worker exited within the configured wait.
    pub async fn cancel(&self, job_id: JobId) -> errors::Result<bool> {
        self.request(|response| CancelJob { job_id, response })
            .await
    }

    pub async fn status(&self, job_id: JobId) -> errors::Result<JobStatus> {
        self.request(|response| GetStatus { job_id, response })
            .await
    }

    /// Follow a job's status. The receiver keeps the last value after the job leaves the registry.
    pub async fn watch_status(&self, job_id: JobId) -> errors::Result<watch::Receiver<JobStatus>> {
        self.request(|response| WatchStatus { job_id, response })
            .await
    }

    /// Ids of the jobs currently in the registry.
    pub async fn active_jobs(&self) -> errors::Result<Vec<JobId>> {
        self.request(|response| ListJobs { response }).await
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<errors::Result<T>>) -> SupervisorMessage,
    ) -> errors::Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(message(tx))
            .await
            .map_err(|_| JobError::SupervisorGone)?;
        rx.await.map_err(|_| JobError::SupervisorGone)?
    }
}
