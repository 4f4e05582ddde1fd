use crate::errors;
use crate::events::JobStatus;
use crate::sink::StatusTarget;
use crate::types::JobId;
use std::path::PathBuf;
use tokio::sync::{oneshot, watch};

pub enum SupervisorMessage {
    StartJob {
        video: PathBuf,
        destination: String,
        target: StatusTarget,
        response: oneshot::Sender<errors::Result<JobId>>,
    },
    CancelJob {
        job_id: JobId,
        response: oneshot::Sender<errors::Result<bool>>,
    },
    GetStatus {
        job_id: JobId,
        response: oneshot::Sender<errors::Result<JobStatus>>,
    },
    WatchStatus {
        job_id: JobId,
        response: oneshot::Sender<errors::Result<watch::Receiver<JobStatus>>>,
    },
    ListJobs {
        response: oneshot::Sender<errors::Result<Vec<JobId>>>,
    },
}
