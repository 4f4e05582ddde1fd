#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Status text produced by a worker and relayed to the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusEvent {
    pub text: String,
    pub is_error: bool,
    /// Set on the last event a job will ever emit.
    pub is_final: bool,
}

impl StatusEvent {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            is_final: false,
        }
    }

    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            is_final: true,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            is_final: true,
        }
    }
}
