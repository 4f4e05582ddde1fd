//! Stubs shared by the unit tests.

use crate::errors::DeliveryError;
use crate::events::StatusEvent;
use crate::sink::StatusSink;
use crate::transcoder::{
    cancelled, MediaInfo, ProgressFn, StreamPlan, StreamProgress, TranscodeError,
    TranscodeResult, Transcoder,
};
use crate::types::MessageId;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicI64, AtomicUsize, Ordering},
    Mutex,
};
use std::time::Duration;
use tokio::sync::watch;

#[derive(Clone, Debug, PartialEq)]
pub enum Delivery {
    Edit(MessageId, StatusEvent),
    Send(MessageId, StatusEvent),
}

impl Delivery {
    pub fn event(&self) -> &StatusEvent {
        match self {
            Delivery::Edit(_, event) | Delivery::Send(_, event) => event,
        }
    }
}

/// Sink that records every successful delivery.
#[derive(Default)]
pub struct RecordingSink {
    deliveries: Mutex<Vec<Delivery>>,
    broken_messages: Vec<MessageId>,
    rejected_texts: Vec<&'static str>,
    next_id: AtomicI64,
}

impl RecordingSink {
    /// Edits of these messages fail, as if they had been deleted.
    pub fn failing_edits_of(broken_messages: Vec<MessageId>) -> Self {
        Self {
            broken_messages,
            ..Default::default()
        }
    }

    /// Sends of these texts fail, and so do edits of any message.
    pub fn rejecting_sends_of(rejected_texts: Vec<&'static str>) -> Self {
        Self {
            rejected_texts,
            ..Default::default()
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.deliveries()
            .iter()
            .map(|d| d.event().text.clone())
            .collect()
    }

    /// Wait until a final event was delivered and return it.
    pub async fn final_event(&self) -> StatusEvent {
        for _ in 0..500 {
            if let Some(event) = self
                .deliveries()
                .iter()
                .map(Delivery::event)
                .find(|e| e.is_final)
            {
                return event.clone();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no final status event, got {:?}", self.texts());
    }
}

#[async_trait]
impl StatusSink for RecordingSink {
    async fn edit(&self, message: MessageId, event: &StatusEvent) -> Result<(), DeliveryError> {
        if self.broken_messages.contains(&message) || !self.rejected_texts.is_empty() {
            return Err(DeliveryError::new("message to edit not found"));
        }
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::Edit(message, event.clone()));
        Ok(())
    }

    async fn send(&self, event: &StatusEvent) -> Result<MessageId, DeliveryError> {
        if self.rejected_texts.iter().any(|t| *t == event.text) {
            return Err(DeliveryError::new("chat unavailable"));
        }
        let id = 1000 + self.next_id.fetch_add(1, Ordering::SeqCst);
        self.deliveries
            .lock()
            .unwrap()
            .push(Delivery::Send(id, event.clone()));
        Ok(id)
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    Succeed,
    Fail(&'static str),
    /// Report these progress outputs, then succeed.
    Progress(u64),
    BlockUntilCancelled,
    /// Never returns, even when cancelled.
    IgnoreCancel,
    ProbeFails,
}

pub struct StubTranscoder {
    behavior: Behavior,
    pub runs: AtomicUsize,
    pub last_input: Mutex<Option<PathBuf>>,
}

impl StubTranscoder {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            runs: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transcoder for StubTranscoder {
    async fn probe(&self, input: &Path) -> TranscodeResult<MediaInfo> {
        if let Behavior::ProbeFails = self.behavior {
            return Err(TranscodeError::ProbeFailed {
                stderr: "moov atom not found".to_string(),
            });
        }
        *self.last_input.lock().unwrap() = Some(input.to_path_buf());
        Ok(MediaInfo {
            duration: 10.0,
            width: 640,
            height: 360,
            video_codec: "h264".to_string(),
            audio_codec: Some("aac".to_string()),
            pix_fmt: "yuv420p".to_string(),
            fps: 30.0,
        })
    }

    async fn transcode(
        &self,
        _plan: &StreamPlan,
        mut on_progress: ProgressFn,
        mut cancel: watch::Receiver<bool>,
    ) -> TranscodeResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(stderr) => Err(TranscodeError::Failed {
                exit_code: Some(1),
                stderr: stderr.to_string(),
            }),
            Behavior::Progress(count) => {
                for frame in 1..=count {
                    on_progress(StreamProgress {
                        frame,
                        ..Default::default()
                    });
                }
                Ok(())
            }
            Behavior::BlockUntilCancelled => {
                cancelled(&mut cancel).await;
                Err(TranscodeError::Cancelled)
            }
            Behavior::IgnoreCancel => {
                std::future::pending::<()>().await;
                Ok(())
            }
            Behavior::ProbeFails => unreachable!("probe fails first"),
        }
    }
}

/// A throwaway "video" file inside `dir`.
pub fn video_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"not really a video").unwrap();
    path
}
