mod actor;

use crate::events::StatusEvent;
use crate::sink::StatusTarget;
use crate::types::JobId;
use actor::Actor;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Forwards one job's status events to its conversation.
///
/// This struct is an actor handle. The relay itself runs in the task spawned by `RelayHandle::spawn`
/// and keeps going until `stop` is called (and the queue is drained) or every event sender is gone.
pub struct RelayHandle {
    stop: watch::Sender<bool>,
}

impl RelayHandle {
    pub fn spawn(
        job_id: JobId,
        events: mpsc::UnboundedReceiver<StatusEvent>,
        target: StatusTarget,
        poll_interval: Duration,
    ) -> Self {
        let (stop, stop_rx) = watch::channel(false);
        Actor::spawn(job_id, events, stop_rx, target, poll_interval);
        Self { stop }
    }

    /// Ask the relay to deliver what is already queued and exit.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }
}
