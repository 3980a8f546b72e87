//! Live connection abstraction used by the broadcast hub.

use crate::error::{Result, SystemError};
use crate::metrics::Snapshot;
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Opaque handle identifying one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A push-style client that receives snapshots.
///
/// The hub owns each subscriber through a dedicated writer task, so `send`
/// is never called concurrently on the same connection and never after
/// `close`.
#[async_trait]
pub trait Subscriber: Send + 'static {
    /// Deliver one snapshot. Any error evicts the subscriber.
    async fn send(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Release the underlying transport.
    async fn close(&mut self);
}

/// Subscriber that forwards snapshots into an in-process channel.
///
/// Delivery fails once the receiving half is dropped.
#[derive(Debug)]
pub struct ChannelSubscriber {
    tx: Option<mpsc::UnboundedSender<Snapshot>>,
}

impl ChannelSubscriber {
    /// Create a subscriber together with the receiver its snapshots arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Snapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn send(&mut self, snapshot: &Snapshot) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| SystemError::delivery_error("channel subscriber closed"))?;
        tx.send(snapshot.clone())
            .map_err(|_| SystemError::delivery_error("receiver dropped"))
    }

    async fn close(&mut self) {
        self.tx = None;
    }
}
