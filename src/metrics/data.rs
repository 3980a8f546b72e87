//! Data structures for host metrics.
//!
//! Field names are part of the wire contract consumed by the dashboard and
//! by `/api/history`, so every struct serializes with stable snake_case keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A complete snapshot of host metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// When this snapshot was taken
    pub timestamp: DateTime<Utc>,
    /// CPU usage statistics
    pub cpu: CpuMetrics,
    /// Memory and swap usage
    pub memory: MemoryMetrics,
    /// Mounted filesystems, in the order the source reported them
    #[serde(default)]
    pub disk: Vec<DiskMetrics>,
    /// Network interfaces, in the order the source reported them
    #[serde(default)]
    pub network: Vec<NetworkMetrics>,
    /// General host information
    pub system: SystemInfo,
    /// Temperature sensor readings (omitted when none are available)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub temperature: Vec<TempMetrics>,
}

/// CPU usage statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    /// Per-core usage percentages (0.0 to 100.0)
    pub usage_percent: Vec<f64>,
    /// Mean usage across all cores (0.0 to 100.0)
    pub total_percent: f64,
    /// Number of logical cores
    pub cores: usize,
    /// Load averages over 1, 5 and 15 minutes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_avg: Vec<f64>,
}

/// Memory and swap usage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub available: u64,
    pub used_percent: f64,
    pub swap_total: u64,
    pub swap_used: u64,
    pub swap_free: u64,
    pub swap_percent: f64,
}

/// Usage of one mounted filesystem.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    /// Device name (e.g., "/dev/sda1")
    pub device: String,
    /// Mount point (e.g., "/", "/boot")
    pub mountpoint: String,
    /// Filesystem type (e.g., "ext4")
    pub fstype: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

/// Cumulative counters for one network interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    /// Interface name (e.g., "eth0")
    pub name: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errin: u64,
    pub errout: u64,
    pub dropin: u64,
    pub dropout: u64,
}

/// General host information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    /// Operating system family (e.g., "linux")
    pub os: String,
    /// Distribution or platform identifier (e.g., "ubuntu")
    pub platform: String,
    pub platform_version: String,
    pub kernel_version: String,
    /// Uptime in seconds
    pub uptime: u64,
    /// Boot time as a Unix timestamp in seconds
    pub boot_time: u64,
    /// Number of running processes
    pub processes: u64,
}

/// A single temperature sensor reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempMetrics {
    pub sensor_key: String,
    /// Temperature in Celsius
    pub temperature: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl Snapshot {
    /// Create an empty snapshot stamped with the current time.
    ///
    /// Every sub-metric starts at its zero value, so a source that fails to
    /// read one of them can simply leave it untouched.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create an empty snapshot with an explicit timestamp.
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            cpu: CpuMetrics::default(),
            memory: MemoryMetrics::default(),
            disk: Vec::new(),
            network: Vec::new(),
            system: SystemInfo::default(),
            temperature: Vec::new(),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Percentage of `part` in `whole`, clamped to [0, 100]. Zero when `whole` is zero.
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    clamp_percent(part as f64 / whole as f64 * 100.0)
}

/// Clamp a percentage into [0, 100], mapping non-finite values to zero.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
