use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use streamjob::{DeliveryError, MessageId, StatusEvent, StatusSink};
use tokio::sync::Notify;

/// Prints status updates to stdout. A terminal cannot edit earlier lines, so edits print too.
#[derive(Default)]
pub struct ConsoleSink {
    next_id: AtomicI64,
    finished: Notify,
    failed: AtomicBool,
}

impl ConsoleSink {
    fn print(&self, event: &StatusEvent) {
        if event.is_error {
            println!("[error] {}", event.text);
        } else {
            println!("{}", event.text);
        }
        if event.is_final {
            self.failed.store(event.is_error, Ordering::SeqCst);
            self.finished.notify_one();
        }
    }

    /// Wait for the job's final status line. Returns whether the job failed.
    pub async fn wait_final(&self) -> bool {
        self.finished.notified().await;
        self.failed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSink for ConsoleSink {
    async fn edit(&self, _message: MessageId, event: &StatusEvent) -> Result<(), DeliveryError> {
        self.print(event);
        Ok(())
    }

    async fn send(&self, event: &StatusEvent) -> Result<MessageId, DeliveryError> {
        self.print(event);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn final_event_wakes_waiter() {
        let sink = ConsoleSink::default();
        sink.send(&StatusEvent::info("starting")).await.unwrap();
        sink.edit(0, &StatusEvent::failed("boom")).await.unwrap();
        let failed = tokio::time::timeout(Duration::from_secs(1), sink.wait_final())
            .await
            .expect("final event not observed");
        assert!(failed);
    }
}
