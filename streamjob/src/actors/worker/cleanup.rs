use crate::actors::relay::RelayHandle;
use crate::events::{JobStatus, StatusEvent};
use crate::types::JobId;
use std::{io, path::PathBuf};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// End-of-job bookkeeping that has to happen exactly once, however the worker stops.
///
/// `finish` runs it on the normal paths. If the worker is dropped first (aborted or panicked),
/// `Drop` runs it with a failure status instead.
pub struct Cleanup {
    job_id: JobId,
    inner: Option<Inner>,
}

struct Inner {
    video: PathBuf,
    status: watch::Sender<JobStatus>,
    events: mpsc::UnboundedSender<StatusEvent>,
    exit_tx: mpsc::UnboundedSender<JobId>,
    relay: RelayHandle,
}

impl Cleanup {
    pub fn new(
        job_id: JobId,
        video: PathBuf,
        status: watch::Sender<JobStatus>,
        events: mpsc::UnboundedSender<StatusEvent>,
        exit_tx: mpsc::UnboundedSender<JobId>,
        relay: RelayHandle,
    ) -> Self {
        Self {
            job_id,
            inner: Some(Inner {
                video,
                status,
                events,
                exit_tx,
                relay,
            }),
        }
    }

    pub fn set_status(&self, status: JobStatus) {
        if let Some(inner) = &self.inner {
            let _ = inner.status.send(status);
        }
    }

    /// Release the job's resources, publish its terminal status and queue its final event.
    pub fn finish(mut self, status: JobStatus, event: StatusEvent) {
        if let Some(inner) = self.inner.take() {
            inner.run(self.job_id, status, event);
        }
    }
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.take() {
            warn!(job_id = %self.job_id, "stream worker stopped without finishing");
            inner.run(
                self.job_id,
                JobStatus::Failed,
                StatusEvent::failed("Stream stopped."),
            );
        }
    }
}

impl Inner {
    fn run(self, job_id: JobId, status: JobStatus, event: StatusEvent) {
        match std::fs::remove_file(&self.video) {
            Ok(()) => debug!(%job_id, video = %self.video.display(), "removed video"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(%job_id, video = %self.video.display(), error = %e, "could not remove video")
            }
        }
        let _ = self.status.send(status);
        let _ = self.events.send(event);
        let _ = self.exit_tx.send(job_id);
        self.relay.stop();
    }
}
