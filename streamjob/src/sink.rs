use crate::errors::DeliveryError;
use crate::events::StatusEvent;
use crate::types::MessageId;
use async_trait::async_trait;
use std::sync::Arc;

/// The conversation a job reports its status to.
///
/// Implemented by the chat client integration: `edit` rewrites a message in place,
/// `send` posts a new one.
#[async_trait]
pub trait StatusSink: Send + Sync + 'static {
    async fn edit(&self, message: MessageId, event: &StatusEvent) -> Result<(), DeliveryError>;

    async fn send(&self, event: &StatusEvent) -> Result<MessageId, DeliveryError>;
}

/// Where a job's status goes: a sink, plus the message to keep editing, if one was already posted.
#[derive(Clone)]
pub struct StatusTarget {
    pub sink: Arc<dyn StatusSink>,
    pub message: Option<MessageId>,
}

impl StatusTarget {
    pub fn new(sink: Arc<dyn StatusSink>, message: Option<MessageId>) -> Self {
        Self { sink, message }
    }
}
