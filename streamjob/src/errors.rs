use crate::transcoder::TranscodeError;
use crate::types::JobId;
use std::{fmt, path::PathBuf, result};
use thiserror::Error;

/// What a `NotFound` error failed to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Video(PathBuf),
    Job(JobId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Video(path) => write!(f, "video file {}", path.display()),
            Missing::Job(job_id) => write!(f, "stream job {}", job_id),
        }
    }
}

#[derive(Error, Debug)]
pub enum JobError {
    #[error("not found: {0}")]
    NotFound(Missing),
    #[error("transcoder failure: {0}")]
    TranscoderFailure(#[from] TranscodeError),
    #[error("status delivery failure: {0}")]
    DeliveryFailure(#[from] DeliveryError),
    #[error("stream cancelled")]
    Cancelled,
    #[error("too many active streams (limit {0})")]
    TooManyJobs(usize),
    #[error("stream supervisor is no longer running")]
    SupervisorGone,
}

impl JobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, JobError::NotFound(_))
    }
}

/// A status message could neither be edited nor sent.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct DeliveryError(pub String);

impl DeliveryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type Result<T> = result::Result<T, JobError>;
