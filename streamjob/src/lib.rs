//! Background re-streaming of local video files to live ingest URLs.
//!
//! A [`StreamSupervisor`] owns every job: it starts a worker that pushes one file through the
//! transcoder to its destination, relays the worker's status text to a conversation, and cancels
//! jobs on request. The transcoder and the conversation are reached only through the
//! [`Transcoder`] and [`StatusSink`] traits.

mod actors;
pub mod config;
pub mod errors;
mod events;
pub mod sink;
pub mod transcoder;
pub mod types;

#[cfg(test)]
mod testing;

// re-export the supervisor handle as if it is the supervisor itself.
pub use actors::supervisor::StreamSupervisorHandle as StreamSupervisor;
pub use config::{StreamSettings, SupervisorConfig};
pub use errors::{DeliveryError, JobError, Missing};
pub use events::{JobStatus, StatusEvent};
pub use sink::{StatusSink, StatusTarget};
pub use transcoder::{FfmpegTranscoder, MediaInfo, Transcoder};
pub use types::{destination, JobId, MessageId};
