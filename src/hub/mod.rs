//! Broadcast hub fanning snapshots out to live subscribers.
//!
//! A single task owns the subscriber set and handles `Register`,
//! `Unregister` and `Publish` one at a time from a queue, so membership
//! changes and fan-out never interleave. Every subscriber gets its own
//! bounded outbound queue drained by a dedicated writer task: a slow or
//! stuck connection only ever stalls itself.
//!
//! Connection lifecycle:
//!
//! ```text
//! Connecting -> Registered -> Replaying -> Live -> Disconnected
//! ```
//!
//! `Disconnected` is terminal and reachable from every state.

pub mod subscriber;

pub use subscriber::{ChannelSubscriber, Subscriber, SubscriberId};

use crate::error::{Result, SystemError};
use crate::metrics::{HistoryRing, Snapshot};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Live items a subscriber may fall behind by before it is evicted.
pub const LIVE_QUEUE_DEPTH: usize = 32;

/// Where a registered connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberState {
    /// Still receiving the history backlog
    Replaying,
    /// Caught up and receiving live snapshots
    Live,
}

/// Point-in-time view of the subscriber set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HubStats {
    pub replaying: usize,
    pub live: usize,
}

impl HubStats {
    pub fn total(&self) -> usize {
        self.replaying + self.live
    }
}

enum Command {
    Register {
        id: SubscriberId,
        outbound: mpsc::Sender<Outbound>,
        cancel: CancellationToken,
        finished: oneshot::Receiver<()>,
    },
    Unregister {
        id: SubscriberId,
    },
    Publish {
        snapshot: Snapshot,
        sequence: Option<u64>,
    },
    MarkLive {
        id: SubscriberId,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

enum Outbound {
    Snapshot(Arc<Snapshot>),
    ReplayComplete,
}

struct Entry {
    outbound: mpsc::Sender<Outbound>,
    cancel: CancellationToken,
    finished: oneshot::Receiver<()>,
    state: SubscriberState,
    /// Ring sequence of the newest replayed snapshot; recorded items at or before it are skipped
    replayed_through: u64,
}

/// Cloneable front of the broadcast hub task.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::UnboundedSender<Command>,
    queue_capacity: usize,
}

/// The task owning the subscriber set.
pub struct BroadcastHub {
    ring: Arc<HistoryRing>,
    subscribers: HashMap<SubscriberId, Entry>,
}

impl BroadcastHub {
    /// Spawn the hub task. New subscribers are replayed the contents of `ring`.
    pub fn spawn(ring: Arc<HistoryRing>) -> HubHandle {
        let (commands, rx) = mpsc::unbounded_channel();
        let queue_capacity = ring.capacity() + LIVE_QUEUE_DEPTH;

        let hub = BroadcastHub {
            ring,
            subscribers: HashMap::new(),
        };
        tokio::spawn(hub.run(rx));

        HubHandle {
            commands,
            queue_capacity,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        while let Some(command) = commands.recv().await {
            match command {
                Command::Register {
                    id,
                    outbound,
                    cancel,
                    finished,
                } => self.register(id, outbound, cancel, finished),
                Command::Unregister { id } => self.unregister(id),
                Command::Publish { snapshot, sequence } => self.publish(snapshot, sequence),
                Command::MarkLive { id } => {
                    if let Some(entry) = self.subscribers.get_mut(&id) {
                        entry.state = SubscriberState::Live;
                        debug!("Client {} caught up with history", id);
                    }
                }
                Command::Stats { reply } => {
                    let _ = reply.send(self.stats());
                }
                Command::Shutdown { reply } => {
                    // Refuse anything queued from here on
                    commands.close();
                    self.shutdown().await;
                    let _ = reply.send(());
                    break;
                }
            }
        }
        debug!("Broadcast hub stopped");
    }

    fn register(
        &mut self,
        id: SubscriberId,
        outbound: mpsc::Sender<Outbound>,
        cancel: CancellationToken,
        finished: oneshot::Receiver<()>,
    ) {
        let (history, replayed_through) = self.ring.get_history_sequenced();

        // The queue is sized for a full ring plus live slack, so the backlog always fits
        for snapshot in history {
            if outbound.try_send(Outbound::Snapshot(Arc::new(snapshot))).is_err() {
                warn!("Error queueing history for client {}", id);
                cancel.cancel();
                return;
            }
        }
        if outbound.try_send(Outbound::ReplayComplete).is_err() {
            cancel.cancel();
            return;
        }

        self.subscribers.insert(
            id,
            Entry {
                outbound,
                cancel,
                finished,
                state: SubscriberState::Replaying,
                replayed_through,
            },
        );
        info!("Client connected: {} ({} total)", id, self.subscribers.len());
    }

    fn unregister(&mut self, id: SubscriberId) {
        if let Some(entry) = self.subscribers.remove(&id) {
            entry.cancel.cancel();
            info!("Client disconnected: {} ({} remaining)", id, self.subscribers.len());
        }
    }

    fn publish(&mut self, snapshot: Snapshot, sequence: Option<u64>) {
        let snapshot = Arc::new(snapshot);
        let mut failed = Vec::new();

        for (id, entry) in &self.subscribers {
            if sequence.is_some_and(|seq| seq <= entry.replayed_through) {
                continue;
            }

            if let Err(e) = entry.outbound.try_send(Outbound::Snapshot(Arc::clone(&snapshot))) {
                let reason = match e {
                    mpsc::error::TrySendError::Full(_) => "client fell too far behind",
                    mpsc::error::TrySendError::Closed(_) => "connection writer stopped",
                };
                warn!("Error writing to client {}: {}", id, reason);
                failed.push(*id);
            }
        }

        for id in failed {
            self.unregister(id);
        }
    }

    fn stats(&self) -> HubStats {
        let mut stats = HubStats::default();
        for entry in self.subscribers.values() {
            match entry.state {
                SubscriberState::Replaying => stats.replaying += 1,
                SubscriberState::Live => stats.live += 1,
            }
        }
        stats
    }

    async fn shutdown(&mut self) {
        let count = self.subscribers.len();
        let mut pending = Vec::with_capacity(count);

        for (_, entry) in self.subscribers.drain() {
            entry.cancel.cancel();
            pending.push(entry.finished);
        }

        // Writers close their connection before signalling
        for finished in pending {
            let _ = finished.await;
        }
        info!("Closed {} client connection(s)", count);
    }
}

impl HubHandle {
    /// Register a connection.
    ///
    /// The connection is first replayed the whole history ring in
    /// chronological order and then receives every later publish. If the hub
    /// has shut down the connection is closed and `HubClosed` is returned.
    pub async fn register<S: Subscriber>(&self, mut connection: S) -> Result<SubscriberId> {
        let id = SubscriberId::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(self.queue_capacity);
        let cancel = CancellationToken::new();
        let (finished_tx, finished_rx) = oneshot::channel();

        let command = Command::Register {
            id,
            outbound: outbound_tx,
            cancel: cancel.clone(),
            finished: finished_rx,
        };
        if self.commands.send(command).is_err() {
            connection.close().await;
            return Err(SystemError::HubClosed);
        }

        tokio::spawn(run_writer(
            id,
            connection,
            outbound_rx,
            cancel,
            self.commands.clone(),
            finished_tx,
        ));
        Ok(id)
    }

    /// Remove a connection and release its transport. Unknown ids are ignored.
    pub fn unregister(&self, id: SubscriberId) {
        let _ = self.commands.send(Command::Unregister { id });
    }

    /// Fan a snapshot out to every registered connection.
    ///
    /// Use [`HubHandle::publish_recorded`] for snapshots that were also
    /// added to the history ring.
    pub fn publish(&self, snapshot: Snapshot) -> Result<()> {
        self.send_publish(snapshot, None)
    }

    /// Fan out a snapshot that `HistoryRing::add` numbered `sequence`.
    ///
    /// Connections whose replay already contained it are skipped, so nobody
    /// receives it twice.
    pub fn publish_recorded(&self, sequence: u64, snapshot: Snapshot) -> Result<()> {
        self.send_publish(snapshot, Some(sequence))
    }

    fn send_publish(&self, snapshot: Snapshot, sequence: Option<u64>) -> Result<()> {
        self.commands
            .send(Command::Publish { snapshot, sequence })
            .map_err(|_| SystemError::HubClosed)
    }

    pub async fn stats(&self) -> Result<HubStats> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Stats { reply })
            .map_err(|_| SystemError::HubClosed)?;
        rx.await.map_err(|_| SystemError::HubClosed)
    }

    /// Number of registered connections, zero once the hub has stopped.
    pub async fn subscriber_count(&self) -> usize {
        self.stats().await.map(|s| s.total()).unwrap_or(0)
    }

    /// Stop accepting registrations and close every connection.
    ///
    /// Resolves once all writers have closed their transport. Calling it on
    /// a hub that already stopped is a no-op.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }
    }
}

/// Drain one subscriber's outbound queue until it fails or is cancelled.
async fn run_writer<S: Subscriber>(
    id: SubscriberId,
    mut connection: S,
    mut outbound: mpsc::Receiver<Outbound>,
    cancel: CancellationToken,
    commands: mpsc::UnboundedSender<Command>,
    _finished: oneshot::Sender<()>,
) {
    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = outbound.recv() => match item {
                Some(item) => item,
                None => break,
            },
        };

        match item {
            Outbound::Snapshot(snapshot) => {
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    sent = connection.send(&snapshot) => sent,
                };
                if let Err(e) = sent {
                    warn!("Error sending to client {}: {}", id, e);
                    break;
                }
            }
            Outbound::ReplayComplete => {
                let _ = commands.send(Command::MarkLive { id });
            }
        }
    }

    connection.close().await;
    let _ = commands.send(Command::Unregister { id });
}
