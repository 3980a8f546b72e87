//! Traits for snapshot collection.

use crate::error::Result;
use crate::metrics::data::Snapshot;
use async_trait::async_trait;

/// A source of host metric snapshots.
///
/// Implementations return a zero-valued substructure for any sub-metric they
/// fail to read and only return an error when no snapshot can be produced at
/// all. A call should not block indefinitely.
#[async_trait]
pub trait SnapshotSource: Send {
    /// Take one sample of every monitored metric.
    async fn sample(&mut self) -> Result<Snapshot>;
}

#[async_trait]
impl<S: SnapshotSource + ?Sized> SnapshotSource for Box<S> {
    async fn sample(&mut self) -> Result<Snapshot> {
        (**self).sample().await
    }
}
