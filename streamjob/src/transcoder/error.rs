use thiserror::Error;

pub type TranscodeResult<T> = Result<T, TranscodeError>;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH")]
    FfprobeNotFound,

    #[error("ffprobe failed: {stderr}")]
    ProbeFailed { stderr: String },

    #[error("no video stream found")]
    NoVideoStream,

    #[error("ffmpeg exited with {}: {}", describe_exit(.exit_code), .stderr)]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("transcode cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ffprobe output parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranscodeError {
    /// Diagnostic text captured from the external tool, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            TranscodeError::ProbeFailed { stderr } | TranscodeError::Failed { stderr, .. } => {
                Some(stderr.as_str()).filter(|s| !s.trim().is_empty())
            }
            _ => None,
        }
    }
}

fn describe_exit(exit_code: &Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}
