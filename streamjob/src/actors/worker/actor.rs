use super::cleanup::Cleanup;
use super::JobSpec;
use crate::config::StreamSettings;
use crate::errors::{self, JobError};
use crate::events::{JobStatus, StatusEvent};
use crate::transcoder::{
    cancelled, ProgressFn, StreamPlan, StreamProgress, TranscodeError, Transcoder,
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::{
    select,
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{info, warn};

pub struct Actor {
    spec: JobSpec,
    transcoder: Arc<dyn Transcoder>,
    settings: StreamSettings,
    progress_interval: Duration,
    events: mpsc::UnboundedSender<StatusEvent>,
    cancel: watch::Receiver<bool>,
    cleanup: Cleanup,
}

impl Actor {
    pub fn spawn(
        spec: JobSpec,
        transcoder: Arc<dyn Transcoder>,
        settings: StreamSettings,
        progress_interval: Duration,
        events: mpsc::UnboundedSender<StatusEvent>,
        cancel: watch::Receiver<bool>,
        cleanup: Cleanup,
    ) -> JoinHandle<()> {
        let actor = Self {
            spec,
            transcoder,
            settings,
            progress_interval,
            events,
            cancel,
            cleanup,
        };
        tokio::spawn(async move { actor.run().await })
    }

    async fn run(mut self) {
        let job_id = self.spec.job_id;
        info!(%job_id, video = %self.spec.video.display(), "stream job starting");
        self.emit(StatusEvent::info("Starting stream..."));

        let (status, event) = match self.stream().await {
            Ok(()) => {
                info!(%job_id, "stream completed");
                (JobStatus::Completed, StatusEvent::completed("Stream completed."))
            }
            Err(JobError::Cancelled) => {
                info!(%job_id, "stream cancelled");
                (JobStatus::Failed, StatusEvent::failed("Stream cancelled."))
            }
            Err(e) => {
                warn!(%job_id, error = %e, "stream failed");
                (
                    JobStatus::Failed,
                    StatusEvent::failed(format!("Stream failed: {}", diagnostic(&e))),
                )
            }
        };
        self.cleanup.finish(status, event);
    }

    /// Probe, build the plan and stream. Every failure comes back as an error, nothing panics out.
    async fn stream(&mut self) -> errors::Result<()> {
        let info = select! {
            info = self.transcoder.probe(&self.spec.video) => info?,
            _ = cancelled(&mut self.cancel) => return Err(JobError::Cancelled),
        };
        let plan = StreamPlan::new(
            &self.spec.video,
            self.spec.destination.clone(),
            &info,
            &self.settings,
        );

        self.cleanup.set_status(JobStatus::Running);
        self.emit(StatusEvent::info(format!(
            "Stream live: {}x{} at {:.2} fps ({} → {}).",
            info.width, info.height, info.fps, info.video_codec, self.settings.video_codec
        )));

        let on_progress = self.progress_reporter();
        match self
            .transcoder
            .transcode(&plan, on_progress, self.cancel.clone())
            .await
        {
            Ok(()) => Ok(()),
            Err(TranscodeError::Cancelled) => Err(JobError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }

    fn emit(&self, event: StatusEvent) {
        let _ = self.events.send(event);
    }

    /// Turn transcoder progress into status updates, at most one per `progress_interval`.
    fn progress_reporter(&self) -> ProgressFn {
        if self.progress_interval.is_zero() {
            return Box::new(|_: StreamProgress| {});
        }
        let events = self.events.clone();
        let interval = self.progress_interval;
        let mut last_sent = Instant::now();
        Box::new(move |progress: StreamProgress| {
            if last_sent.elapsed() >= interval {
                last_sent = Instant::now();
                let _ = events.send(StatusEvent::info(format!(
                    "Streaming: {}",
                    progress.summary()
                )));
            }
        })
    }
}

/// The most useful text to show for a failed stream: the tool's own output when there is any.
fn diagnostic(error: &JobError) -> String {
    match error {
        JobError::TranscoderFailure(e) => match e.diagnostic() {
            Some(stderr) => stderr.to_string(),
            None => e.to_string(),
        },
        other => other.to_string(),
    }
}
