//! Host metrics collection backed by sysinfo.

use crate::error::{Result, SystemError};
use crate::metrics::{
    data::*,
    traits::SnapshotSource,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use sysinfo::{Components, Disks, Networks, System};
use tracing::debug;

/// Filesystems that never represent real storage.
const SKIPPED_FILESYSTEMS: &[&str] = &[
    "devfs", "devtmpfs", "tmpfs", "sysfs", "proc",
    "cgroup", "cgroup2", "cpuset", "configfs", "debugfs",
    "tracefs", "securityfs", "pstore", "autofs", "mqueue",
    "hugetlbfs", "fusectl", "rpc_pipefs", "overlay", "squashfs",
];

/// Snapshot source reading the local host through sysinfo.
///
/// The sysinfo handles are kept alive between samples so CPU usage is
/// computed as a delta since the previous call. Refreshing is blocking, so
/// each sample runs on the blocking thread pool.
///
/// Clones share one probe and therefore one CPU measurement window. Callers
/// sampling on their own schedule should create a separate collector with
/// [`SystemCollector::new`].
#[derive(Clone)]
pub struct SystemCollector {
    probe: Arc<Mutex<Probe>>,
}

struct Probe {
    system: System,
    disks: Disks,
    networks: Networks,
    components: Components,
}

impl SystemCollector {
    /// Create a new system collector instance.
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        Self {
            probe: Arc::new(Mutex::new(Probe {
                system,
                disks: Disks::new_with_refreshed_list(),
                networks: Networks::new_with_refreshed_list(),
                components: Components::new_with_refreshed_list(),
            })),
        }
    }
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for SystemCollector {
    async fn sample(&mut self) -> Result<Snapshot> {
        let probe = Arc::clone(&self.probe);
        tokio::task::spawn_blocking(move || probe.lock().collect())
            .await
            .map_err(|e| SystemError::sample_error(format!("sampling task failed: {}", e)))
    }
}

impl Probe {
    fn refresh(&mut self) {
        self.system.refresh_all();
        self.disks.refresh_list();
        self.networks.refresh();
        self.components.refresh();
    }

    fn collect(&mut self) -> Snapshot {
        self.refresh();

        let mut snapshot = Snapshot::new();
        snapshot.cpu = self.collect_cpu();
        snapshot.memory = self.collect_memory();
        snapshot.disk = self.collect_disks();
        snapshot.network = self.collect_networks();
        snapshot.system = self.collect_system();
        snapshot.temperature = self.collect_temperatures();

        debug!(
            disks = snapshot.disk.len(),
            interfaces = snapshot.network.len(),
            sensors = snapshot.temperature.len(),
            "collected snapshot"
        );
        snapshot
    }

    fn collect_cpu(&self) -> CpuMetrics {
        let usage_percent: Vec<f64> = self
            .system
            .cpus()
            .iter()
            .map(|cpu| clamp_percent(cpu.cpu_usage() as f64))
            .collect();

        let total_percent = if usage_percent.is_empty() {
            0.0
        } else {
            clamp_percent(usage_percent.iter().sum::<f64>() / usage_percent.len() as f64)
        };

        // Load averages are meaningless on Windows
        let load_avg = if cfg!(windows) {
            Vec::new()
        } else {
            let load = System::load_average();
            vec![load.one, load.five, load.fifteen]
        };

        CpuMetrics {
            cores: usage_percent.len(),
            usage_percent,
            total_percent,
            load_avg,
        }
    }

    fn collect_memory(&self) -> MemoryMetrics {
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        let swap_total = self.system.total_swap();
        let swap_used = self.system.used_swap();

        MemoryMetrics {
            total,
            used,
            free: self.system.free_memory(),
            available: self.system.available_memory(),
            used_percent: percent_of(used, total),
            swap_total,
            swap_used,
            swap_free: self.system.free_swap(),
            swap_percent: percent_of(swap_used, swap_total),
        }
    }

    fn collect_disks(&self) -> Vec<DiskMetrics> {
        self.disks
            .iter()
            .filter_map(|disk| {
                let fstype = disk.file_system().to_string_lossy().to_string();
                let total = disk.total_space();
                if should_skip_filesystem(&fstype) || total == 0 {
                    return None;
                }

                let free = disk.available_space();
                let used = total.saturating_sub(free);

                Some(DiskMetrics {
                    device: disk.name().to_string_lossy().to_string(),
                    mountpoint: disk.mount_point().to_string_lossy().to_string(),
                    fstype,
                    total,
                    used,
                    free,
                    used_percent: percent_of(used, total),
                })
            })
            .collect()
    }

    fn collect_networks(&self) -> Vec<NetworkMetrics> {
        let mut interfaces: Vec<NetworkMetrics> = self
            .networks
            .iter()
            .filter(|(name, data)| {
                !is_loopback(name) && (data.total_transmitted() > 0 || data.total_received() > 0)
            })
            .map(|(name, data)| NetworkMetrics {
                name: name.clone(),
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
                packets_sent: data.total_packets_transmitted(),
                packets_recv: data.total_packets_received(),
                errin: data.total_errors_on_received(),
                errout: data.total_errors_on_transmitted(),
                // sysinfo does not expose drop counters
                dropin: 0,
                dropout: 0,
            })
            .collect();

        // sysinfo keeps interfaces in a hash map
        interfaces.sort_by(|a, b| a.name.cmp(&b.name));
        interfaces
    }

    fn collect_system(&self) -> SystemInfo {
        SystemInfo {
            hostname: System::host_name().unwrap_or_default(),
            os: std::env::consts::OS.to_string(),
            platform: System::distribution_id(),
            platform_version: System::os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            uptime: System::uptime(),
            boot_time: System::boot_time(),
            processes: self.system.processes().len() as u64,
        }
    }

    fn collect_temperatures(&self) -> Vec<TempMetrics> {
        self.components
            .list()
            .iter()
            .filter(|component| component.temperature() > 0.0)
            .map(|component| TempMetrics {
                sensor_key: component.label().to_string(),
                temperature: component.temperature() as f64,
                label: component.label().to_string(),
            })
            .collect()
    }
}

/// Whether a filesystem type is a pseudo filesystem to leave out of disk usage.
pub fn should_skip_filesystem(fstype: &str) -> bool {
    SKIPPED_FILESYSTEMS.contains(&fstype)
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name == "lo0"
}
