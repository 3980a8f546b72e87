//! # System Monitor - Host Metrics Dashboard
//!
//! Periodically samples host resource metrics (CPU, memory, disk, network,
//! sensors and system information) and distributes them to web clients over
//! a WebSocket push channel and a JSON pull endpoint, keeping a bounded
//! rolling history.
//!
//! ## Features
//!
//! - **Collection loop**: samples on a fixed interval, skipping failed ticks
//! - **Rolling history**: oldest-evicting ring safe for one writer and many readers
//! - **Broadcast hub**: single-owner fan-out with per-client fault isolation
//! - **Web dashboard**: REST API, WebSocket streaming and static files
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use system_monitor::{BroadcastHub, CollectionLoop, HistoryRing, MonitorConfig, SystemCollector};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MonitorConfig::default();
//!     config.validate()?;
//!
//!     let ring = Arc::new(HistoryRing::new(config.history_capacity));
//!     let hub = BroadcastHub::spawn(Arc::clone(&ring));
//!     let cancel = CancellationToken::new();
//!
//!     let task = CollectionLoop::new(SystemCollector::new(), ring, hub, config.interval)
//!         .spawn(cancel.clone());
//!
//!     tokio::signal::ctrl_c().await?;
//!     cancel.cancel();
//!     task.await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod hub;
pub mod metrics;
pub mod web;

// Re-export public API
pub use config::MonitorConfig;
pub use error::{Result, SystemError};
pub use hub::{BroadcastHub, HubHandle, HubStats, Subscriber, SubscriberId};
pub use metrics::{
    collector::SystemCollector,
    data::{CpuMetrics, DiskMetrics, MemoryMetrics, NetworkMetrics, Snapshot, SystemInfo, TempMetrics},
    history::HistoryRing,
    sampler::CollectionLoop,
    traits::SnapshotSource,
};
pub use web::{start_web_server, AppState, WebConfig};

use std::time::Duration;

/// The default collection interval in milliseconds
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// The default number of snapshots kept in history
pub const DEFAULT_HISTORY_SIZE: usize = 60;

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// Upper bound on graceful shutdown before the process gives up waiting
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);
