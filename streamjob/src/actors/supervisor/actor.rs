use super::messages::SupervisorMessage;
use crate::actors::worker::{JobSpec, WorkerHandle};
use crate::config::SupervisorConfig;
use crate::errors::{self, JobError, Missing};
use crate::events::JobStatus;
use crate::sink::StatusTarget;
use crate::transcoder::Transcoder;
use crate::types::JobId;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tokio::{
    select,
    sync::{mpsc, oneshot, watch},
};
use tracing::{debug, info};

/// Owns the job registry. Every mutation of it happens on this actor's task.
pub struct StreamSupervisor {
    inbox: mpsc::Receiver<SupervisorMessage>,
    exits: mpsc::UnboundedReceiver<JobId>,
    exit_tx: mpsc::UnboundedSender<JobId>,
    jobs: HashMap<JobId, WorkerHandle>,
    transcoder: Arc<dyn Transcoder>,
    config: SupervisorConfig,
}

impl StreamSupervisor {
    pub fn spawn(
        inbox: mpsc::Receiver<SupervisorMessage>,
        transcoder: Arc<dyn Transcoder>,
        config: SupervisorConfig,
    ) {
        let (exit_tx, exits) = mpsc::unbounded_channel();
        let actor = Self {
            inbox,
            exits,
            exit_tx,
            jobs: HashMap::new(),
            transcoder,
            config,
        };
        tokio::spawn(async move { actor.run().await });
    }

    async fn run(mut self) {
        use self::SupervisorMessage::*;
        loop {
            select! {
                maybe_msg = self.inbox.recv() => {
                    match maybe_msg {
                        Some(StartJob { video, destination, target, response }) => {
                            let _ = response.send(self.start_job(video, destination, target));
                        }
                        Some(CancelJob { job_id, response }) => self.cancel_job(job_id, response),
                        Some(GetStatus { job_id, response }) => {
                            let _ = response.send(self.get_job(job_id).map(WorkerHandle::status));
                        }
                        Some(WatchStatus { job_id, response }) => {
                            let _ = response.send(self.get_job(job_id).map(WorkerHandle::watch_status));
                        }
                        Some(ListJobs { response }) => {
                            let _ = response.send(Ok(self.jobs.keys().copied().collect()));
                        }
                        None => {
                            // every handle dropped; dropping the workers' cancel senders stops them
                            if !self.jobs.is_empty() {
                                info!(jobs = self.jobs.len(), "supervisor shutting down, cancelling streams");
                            }
                            self.jobs.clear();
                            return;
                        }
                    }
                }
                Some(job_id) = self.exits.recv() => self.job_exited(job_id),
            }
        }
    }

    fn start_job(
        &mut self,
        video: PathBuf,
        destination: String,
        target: StatusTarget,
    ) -> errors::Result<JobId> {
        if !video.is_file() {
            return Err(JobError::NotFound(Missing::Video(video)));
        }
        if let Some(limit) = self.config.max_jobs {
            if self.jobs.len() >= limit {
                return Err(JobError::TooManyJobs(limit));
            }
        }

        let job_id = self.fresh_job_id();
        let spec = JobSpec {
            job_id,
            video,
            destination,
        };
        let worker = WorkerHandle::spawn(
            spec,
            target,
            self.transcoder.clone(),
            &self.config,
            self.exit_tx.clone(),
        );
        self.jobs.insert(job_id, worker);
        info!(%job_id, active = self.jobs.len(), "stream job registered");
        Ok(job_id)
    }

    fn fresh_job_id(&self) -> JobId {
        loop {
            let job_id = uuid::Uuid::new_v4();
            if !self.jobs.contains_key(&job_id) {
                return job_id;
            }
        }
    }

    /// The entry leaves the registry right away; the bounded wait for the worker runs off the actor task.
    fn cancel_job(&mut self, job_id: JobId, response: oneshot::Sender<errors::Result<bool>>) {
        match self.jobs.remove(&job_id) {
            Some(worker) => {
                info!(%job_id, "cancelling stream job");
                let wait = self.config.cancel_wait;
                tokio::spawn(async move {
                    let stopped = worker.cancel(job_id, wait).await;
                    let _ = response.send(Ok(stopped));
                });
            }
            None => {
                let _ = response.send(Err(JobError::NotFound(Missing::Job(job_id))));
            }
        }
    }

    fn get_job(&self, job_id: JobId) -> errors::Result<&WorkerHandle> {
        self.jobs
            .get(&job_id)
            .ok_or(JobError::NotFound(Missing::Job(job_id)))
    }

    fn job_exited(&mut self, job_id: JobId) {
        match self.jobs.remove(&job_id) {
            Some(worker) => {
                let status: JobStatus = worker.status();
                debug!(%job_id, ?status, "stream job exited");
            }
            // already removed by a cancel
            None => debug!(%job_id, "cancelled stream job exited"),
        }
    }
}
