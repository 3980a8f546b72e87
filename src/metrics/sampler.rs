//! Timer-driven collection loop feeding the history ring and the hub.

use crate::hub::HubHandle;
use crate::metrics::{HistoryRing, SnapshotSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Periodically samples a source, records the result and publishes it.
pub struct CollectionLoop<S> {
    source: S,
    ring: Arc<HistoryRing>,
    hub: HubHandle,
    interval: Duration,
}

impl<S: SnapshotSource + 'static> CollectionLoop<S> {
    /// `interval` must be non-zero; see [`crate::MonitorConfig::validate`].
    pub fn new(source: S, ring: Arc<HistoryRing>, hub: HubHandle, interval: Duration) -> Self {
        Self {
            source,
            ring,
            hub,
            interval,
        }
    }

    /// Run the loop on its own task until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// Run the loop until `cancel` fires.
    ///
    /// Each tick waits for the interval, takes one sample and, on success,
    /// appends it to the ring before publishing it. A failed sample is logged
    /// and skipped. Cancellation abandons an in-flight sample, after which
    /// neither the ring nor the hub is touched again.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Collection loop started with {:?} interval", self.interval);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let sampled = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                sampled = self.source.sample() => sampled,
            };

            match sampled {
                Ok(snapshot) => {
                    let sequence = self.ring.add(snapshot.clone());
                    if let Err(e) = self.hub.publish_recorded(sequence, snapshot) {
                        warn!("Failed to publish snapshot: {}", e);
                    }
                    debug!("Recorded snapshot ({} in history)", self.ring.size());
                }
                Err(e) => error!("Error collecting metrics: {}", e),
            }
        }

        info!("Collection loop stopped");
    }
}
