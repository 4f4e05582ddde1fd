//! The external transcoder seam: probing a source file and running it out to a live destination.

mod error;
mod ffmpeg;
mod plan;
mod probe;
mod progress;

pub use error::{TranscodeError, TranscodeResult};
pub use ffmpeg::FfmpegTranscoder;
pub use plan::StreamPlan;
pub use probe::MediaInfo;
pub use progress::StreamProgress;

use async_trait::async_trait;
use std::path::Path;
use tokio::sync::watch;

/// Receives parsed progress while a transcode runs.
pub type ProgressFn = Box<dyn FnMut(StreamProgress) + Send>;

#[async_trait]
pub trait Transcoder: Send + Sync + 'static {
    /// Probe the media properties of a local file.
    async fn probe(&self, input: &Path) -> TranscodeResult<MediaInfo>;

    /// Run `plan` until the source is exhausted, the destination fails, or `cancel` is raised.
    ///
    /// Implementations must return `TranscodeError::Cancelled` promptly once `cancel` flips to
    /// `true` or its sender is dropped.
    async fn transcode(
        &self,
        plan: &StreamPlan,
        on_progress: ProgressFn,
        cancel: watch::Receiver<bool>,
    ) -> TranscodeResult<()>;
}

/// Resolves once `cancel` is raised. A dropped sender counts as raised.
pub async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    while !*cancel.borrow() {
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
