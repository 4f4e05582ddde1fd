use super::error::{TranscodeError, TranscodeResult};
use super::plan::{redact, StreamPlan};
use super::probe::{parse_probe_output, probe_args, MediaInfo};
use super::progress::{is_progress_line, parse_progress_line, StreamProgress};
use super::{cancelled, ProgressFn, Transcoder};

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::Command,
    select,
    sync::watch,
};
use tracing::{debug, info};

/// Number of trailing stderr log lines kept as the diagnostic of a failed run.
const STDERR_TAIL_LINES: usize = 20;

/// `Transcoder` backed by the ffmpeg and ffprobe command-line tools.
#[derive(Clone, Debug, Default)]
pub struct FfmpegTranscoder {
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl FfmpegTranscoder {
    /// Look both binaries up in `PATH` when they are first needed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use explicit binaries. `None` falls back to a `PATH` lookup.
    pub fn with_binaries(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self { ffmpeg, ffprobe }
    }

    fn ffmpeg(&self) -> TranscodeResult<PathBuf> {
        match &self.ffmpeg {
            Some(path) => Ok(path.clone()),
            None => which::which("ffmpeg").map_err(|_| TranscodeError::FfmpegNotFound),
        }
    }

    fn ffprobe(&self) -> TranscodeResult<PathBuf> {
        match &self.ffprobe {
            Some(path) => Ok(path.clone()),
            None => which::which("ffprobe").map_err(|_| TranscodeError::FfprobeNotFound),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn probe(&self, input: &Path) -> TranscodeResult<MediaInfo> {
        let output = Command::new(self.ffprobe()?)
            .args(probe_args())
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::ProbeFailed {
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        parse_probe_output(&output.stdout)
    }

    async fn transcode(
        &self,
        plan: &StreamPlan,
        on_progress: ProgressFn,
        cancel: watch::Receiver<bool>,
    ) -> TranscodeResult<()> {
        let mut command = Command::new(self.ffmpeg()?);
        command.args(plan.args());
        debug!(args = %plan.redacted_args(), "running ffmpeg");
        info!(
            input = %plan.input().display(),
            destination = %redact(plan.destination()),
            "streaming"
        );
        supervise(command, on_progress, cancel).await
    }
}

/// Run `command` to completion, feeding its stderr progress to `on_progress` and killing it on cancel.
///
/// Whatever stdio the caller configured is replaced: stdin and stdout are discarded, stderr is read here.
pub(crate) async fn supervise(
    mut command: Command,
    mut on_progress: ProgressFn,
    mut cancel: watch::Receiver<bool>,
) -> TranscodeResult<()> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    // split stderr into progress updates and a bounded tail of log lines
    let stderr_reader = child.stderr.take().map(|stderr| {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            let mut progress = StreamProgress::default();
            while let Ok(Some(line)) = lines.next_line().await {
                if is_progress_line(&line) {
                    if let Some(snapshot) = parse_progress_line(&line, &mut progress) {
                        on_progress(snapshot);
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            Vec::from(tail).join("\n")
        })
    });

    let exit_status = select! {
        exit_status = child.wait() => exit_status?,
        _ = cancelled(&mut cancel) => {
            debug!("cancel raised, killing ffmpeg");
            let _ = child.kill().await;
            if let Some(reader) = stderr_reader {
                // no progress may be reported after this returns
                reader.abort();
                let _ = reader.await;
            }
            return Err(TranscodeError::Cancelled);
        }
    };

    let stderr = match stderr_reader {
        Some(reader) => reader.await.unwrap_or_default(),
        None => String::new(),
    };

    if exit_status.success() {
        Ok(())
    } else {
        Err(TranscodeError::Failed {
            exit_code: exit_status.code(),
            stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    fn no_progress() -> ProgressFn {
        Box::new(|_: StreamProgress| {})
    }

    #[tokio::test]
    async fn clean_exit_is_ok() {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        supervise(shell("exit 0"), no_progress(), cancel_rx)
            .await
            .expect("clean exit");
    }

    #[tokio::test]
    async fn failure_carries_exit_code_and_stderr_tail() {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let script = "echo 'frame=1' >&2; echo 'progress=continue' >&2; \
                      echo 'rtmp://host: Connection refused' >&2; exit 3";
        match supervise(shell(script), no_progress(), cancel_rx).await {
            Err(TranscodeError::Failed { exit_code, stderr }) => {
                assert_eq!(exit_code, Some(3));
                assert_eq!(stderr, "rtmp://host: Connection refused");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn progress_blocks_reach_callback() {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let script = "printf 'frame=10\\nout_time_us=2000000\\nspeed=1.0x\\nprogress=continue\\n\
                      frame=20\\nprogress=end\\n' >&2";
        supervise(
            shell(script),
            Box::new(move |p: StreamProgress| sink.lock().unwrap().push(p)),
            cancel_rx,
        )
        .await
        .expect("clean exit");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].frame, 10);
        assert_eq!(seen[0].out_time_ms, 2000);
        assert_eq!(seen[1].frame, 20);
        assert!(seen[1].is_complete);
    }

    #[tokio::test]
    async fn cancel_kills_child() {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let started = Instant::now();
        let run = tokio::spawn(supervise(shell("sleep 30"), no_progress(), cancel_rx));
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel_tx.send(true).unwrap();
        let result = tokio::time::timeout(Duration::from_secs(5), run)
            .await
            .expect("supervise did not return after cancel")
            .expect("task panicked");
        assert!(matches!(result, Err(TranscodeError::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_binary_is_reported() {
        let transcoder = FfmpegTranscoder::with_binaries(
            Some("/nonexistent/ffmpeg".into()),
            Some("/nonexistent/ffprobe".into()),
        );
        let err = transcoder.probe(Path::new("clip.mp4")).await.unwrap_err();
        assert!(matches!(err, TranscodeError::Io(_)));
    }
}
