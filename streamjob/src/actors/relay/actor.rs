use crate::errors::{self, JobError};
use crate::events::StatusEvent;
use crate::sink::{StatusSink, StatusTarget};
use crate::types::{JobId, MessageId};

use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time,
};
use tracing::{debug, warn};

pub struct Actor {
    job_id: JobId,
    events: mpsc::UnboundedReceiver<StatusEvent>,
    stop: watch::Receiver<bool>,
    sink: Arc<dyn StatusSink>,
    /// message currently being edited in place
    target: Option<MessageId>,
    poll_interval: Duration,
}

impl Actor {
    pub fn spawn(
        job_id: JobId,
        events: mpsc::UnboundedReceiver<StatusEvent>,
        stop: watch::Receiver<bool>,
        target: StatusTarget,
        poll_interval: Duration,
    ) -> JoinHandle<()> {
        let actor = Self {
            job_id,
            events,
            stop,
            sink: target.sink,
            target: target.message,
            poll_interval,
        };
        tokio::spawn(async move { actor.run().await })
    }

    async fn run(mut self) {
        loop {
            if *self.stop.borrow() {
                // the worker queues its final event before raising stop
                while let Ok(event) = self.events.try_recv() {
                    self.relay(event).await;
                }
                break;
            }
            match time::timeout(self.poll_interval, self.events.recv()).await {
                Ok(Some(event)) => self.relay(event).await,
                // every sender is gone, nothing more can arrive
                Ok(None) => break,
                Err(_elapsed) => continue,
            }
        }
        debug!(job_id = %self.job_id, "status relay stopped");
    }

    async fn relay(&mut self, event: StatusEvent) {
        if let Err(e) = self.deliver(&event).await {
            warn!(job_id = %self.job_id, error = %e, text = %event.text, "dropping status update");
        }
    }

    /// Edit the current status message, or post a new one and edit that from now on.
    async fn deliver(&mut self, event: &StatusEvent) -> errors::Result<()> {
        if let Some(message) = self.target {
            match self.sink.edit(message, event).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!(job_id = %self.job_id, message_id = message, error = %e, "edit failed, sending a new message");
                }
            }
        }
        let message = self.sink.send(event).await.map_err(JobError::from)?;
        self.target = Some(message);
        Ok(())
    }
}
