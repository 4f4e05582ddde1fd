use crate::console::ConsoleSink;
use std::{error::Error, path::Path, sync::Arc, time::Duration};
use streamjob::{
    destination, FfmpegTranscoder, StatusTarget, StreamSupervisor, SupervisorConfig, Transcoder,
};
use tokio::select;
use tracing::info;

pub struct StreamCli {
    transcoder: Arc<FfmpegTranscoder>,
    supervisor: StreamSupervisor,
}

impl StreamCli {
    pub fn new(transcoder: FfmpegTranscoder, config: SupervisorConfig) -> Self {
        let transcoder = Arc::new(transcoder);
        let supervisor = StreamSupervisor::spawn(config, transcoder.clone());
        Self {
            transcoder,
            supervisor,
        }
    }

    /// Stream `video` and wait for the job to end. Returns whether it completed successfully.
    pub async fn stream(
        &self,
        video: &Path,
        url: &str,
        key: &str,
        consume: bool,
    ) -> Result<bool, Box<dyn Error>> {
        // the job deletes what it streams, so work on a copy unless told otherwise
        let spool = if consume {
            None
        } else {
            Some(tempfile::Builder::new().prefix("streamctl-").tempdir()?)
        };
        let source = match &spool {
            Some(dir) => {
                let file_name = video.file_name().ok_or("video path has no file name")?;
                let copy = dir.path().join(file_name);
                tokio::fs::copy(video, &copy).await?;
                copy
            }
            None => video.to_path_buf(),
        };

        let sink = Arc::new(ConsoleSink::default());
        let job_id = self
            .supervisor
            .start(source, destination(url, key), StatusTarget::new(sink.clone(), None))
            .await?;
        println!("Started stream job id: {}", job_id);

        select! {
            failed = sink.wait_final() => Ok(!failed),
            _ = tokio::signal::ctrl_c() => {
                info!(%job_id, "interrupted, cancelling stream");
                let stopped = self.supervisor.cancel(job_id).await?;
                // give the relay a moment to print the final line
                let _ = tokio::time::timeout(Duration::from_secs(2), sink.wait_final()).await;
                if !stopped {
                    println!("Stream job {} did not stop in time and was aborted", job_id);
                }
                Ok(false)
            }
        }
    }

    pub async fn probe(&self, video: &Path) -> Result<(), Box<dyn Error>> {
        let info = self.transcoder.probe(video).await?;
        println!("duration:    {:.2}s", info.duration);
        println!("resolution:  {}x{}", info.width, info.height);
        println!("frame rate:  {:.3} fps", info.fps);
        println!("video codec: {}", info.video_codec);
        println!(
            "audio codec: {}",
            info.audio_codec.as_deref().unwrap_or("none")
        );
        println!("pixel fmt:   {}", info.pix_fmt);
        Ok(())
    }
}
