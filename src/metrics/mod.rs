//! Host metrics: data model, sampling, history and the collection loop.
//!
//! The [`SystemCollector`] reads CPU, memory, disk, network, sensor and
//! host information through sysinfo. Samples flow through the
//! [`CollectionLoop`] into the [`HistoryRing`] and out to the broadcast hub.

pub mod collector;
pub mod data;
pub mod history;
pub mod sampler;
pub mod traits;

// Re-export commonly used items
pub use collector::SystemCollector;
pub use data::Snapshot;
pub use history::HistoryRing;
pub use sampler::CollectionLoop;
pub use traits::SnapshotSource;
