use chrono::{TimeZone, Utc};
use system_monitor::{
    error::SystemError,
    metrics::data::*,
    MonitorConfig, WebConfig,
};

fn sample_snapshot() -> Snapshot {
    Snapshot {
        timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        cpu: CpuMetrics {
            usage_percent: vec![20.0, 25.0, 30.0, 25.0],
            total_percent: 25.0,
            cores: 4,
            load_avg: vec![1.25, 1.5, 1.0],
        },
        memory: MemoryMetrics {
            total: 8 * 1024 * 1024 * 1024,     // 8GB
            used: 4 * 1024 * 1024 * 1024,      // 4GB
            free: 2 * 1024 * 1024 * 1024,      // 2GB
            available: 4 * 1024 * 1024 * 1024, // 4GB
            used_percent: 50.0,
            swap_total: 2 * 1024 * 1024 * 1024,
            swap_used: 512 * 1024 * 1024,
            swap_free: 1536 * 1024 * 1024,
            swap_percent: 25.0,
        },
        disk: vec![DiskMetrics {
            device: "/dev/sda1".to_string(),
            mountpoint: "/".to_string(),
            fstype: "ext4".to_string(),
            total: 500 * 1024 * 1024 * 1024,
            used: 250 * 1024 * 1024 * 1024,
            free: 250 * 1024 * 1024 * 1024,
            used_percent: 50.0,
        }],
        network: vec![NetworkMetrics {
            name: "eth0".to_string(),
            bytes_sent: 1_000_000,
            bytes_recv: 2_000_000,
            packets_sent: 1000,
            packets_recv: 2000,
            errin: 1,
            errout: 0,
            dropin: 3,
            dropout: 0,
        }],
        system: SystemInfo {
            hostname: "test-host".to_string(),
            os: "linux".to_string(),
            platform: "debian".to_string(),
            platform_version: "12".to_string(),
            kernel_version: "6.1.0".to_string(),
            uptime: 86400,
            boot_time: 1_709_208_000,
            processes: 150,
        },
        temperature: vec![TempMetrics {
            sensor_key: "coretemp".to_string(),
            temperature: 45.5,
            label: "coretemp".to_string(),
        }],
    }
}

/// The JSON field names are what the dashboard reads
#[test]
fn test_wire_field_names() {
    let json = serde_json::to_value(sample_snapshot()).expect("Should serialize");

    for key in ["timestamp", "cpu", "memory", "disk", "network", "system", "temperature"] {
        assert!(json.get(key).is_some(), "missing top-level field {}", key);
    }

    let cpu = &json["cpu"];
    for key in ["usage_percent", "total_percent", "cores", "load_avg"] {
        assert!(cpu.get(key).is_some(), "missing cpu.{}", key);
    }

    let memory = &json["memory"];
    for key in [
        "total", "used", "free", "available", "used_percent",
        "swap_total", "swap_used", "swap_free", "swap_percent",
    ] {
        assert!(memory.get(key).is_some(), "missing memory.{}", key);
    }

    let disk = &json["disk"][0];
    for key in ["device", "mountpoint", "fstype", "total", "used", "free", "used_percent"] {
        assert!(disk.get(key).is_some(), "missing disk[].{}", key);
    }

    let network = &json["network"][0];
    for key in [
        "name", "bytes_sent", "bytes_recv", "packets_sent", "packets_recv",
        "errin", "errout", "dropin", "dropout",
    ] {
        assert!(network.get(key).is_some(), "missing network[].{}", key);
    }

    let system = &json["system"];
    for key in [
        "hostname", "os", "platform", "platform_version", "kernel_version",
        "uptime", "boot_time", "processes",
    ] {
        assert!(system.get(key).is_some(), "missing system.{}", key);
    }

    let temperature = &json["temperature"][0];
    for key in ["sensor_key", "temperature", "label"] {
        assert!(temperature.get(key).is_some(), "missing temperature[].{}", key);
    }
}

#[test]
fn test_timestamp_is_rfc3339() {
    let json = serde_json::to_value(sample_snapshot()).unwrap();
    assert_eq!(json["timestamp"], "2024-03-01T12:00:00Z");
}

#[test]
fn test_snapshot_deserializes_from_wire() {
    let json = serde_json::to_string(&sample_snapshot()).unwrap();
    let parsed: Snapshot = serde_json::from_str(&json).expect("Should deserialize");
    assert_eq!(parsed, sample_snapshot());
}

#[test]
fn test_missing_temperature_and_load_are_accepted() {
    let json = r#"{
        "timestamp": "2024-03-01T12:00:00Z",
        "cpu": {"usage_percent": [], "total_percent": 0.0, "cores": 0},
        "memory": {"total": 0, "used": 0, "free": 0, "available": 0, "used_percent": 0.0,
                   "swap_total": 0, "swap_used": 0, "swap_free": 0, "swap_percent": 0.0},
        "disk": [],
        "network": [],
        "system": {"hostname": "", "os": "", "platform": "", "platform_version": "",
                   "kernel_version": "", "uptime": 0, "boot_time": 0, "processes": 0}
    }"#;

    let parsed: Snapshot = serde_json::from_str(json).expect("Should deserialize");
    assert!(parsed.temperature.is_empty());
    assert!(parsed.cpu.load_avg.is_empty());
}

#[test]
fn test_empty_label_is_omitted() {
    let reading = TempMetrics {
        sensor_key: "acpitz".to_string(),
        temperature: 30.0,
        label: String::new(),
    };
    let json = serde_json::to_value(reading).unwrap();
    assert!(json.get("label").is_none());
}

#[test]
fn test_default_substructures_are_zero() {
    let snapshot = Snapshot::new();
    assert_eq!(snapshot.cpu, CpuMetrics::default());
    assert_eq!(snapshot.memory.total, 0);
    assert_eq!(snapshot.memory.used_percent, 0.0);
    assert!(snapshot.disk.is_empty());
    assert!(snapshot.network.is_empty());
    assert!(snapshot.system.hostname.is_empty());
}

#[test]
fn test_system_error_types() {
    let sample_error = SystemError::sample_error("host probe unavailable");
    assert!(format!("{}", sample_error).contains("host probe unavailable"));

    let delivery_error = SystemError::delivery_error("broken pipe");
    assert!(format!("{}", delivery_error).contains("broken pipe"));

    let web_error = SystemError::web_server_error("Server startup failed");
    assert!(format!("{}", web_error).contains("Server startup failed"));

    let config_error = SystemError::config_error("Invalid configuration");
    assert!(format!("{}", config_error).contains("Invalid configuration"));

    assert_eq!(SystemError::HubClosed.to_string(), "Broadcast hub is closed");
}

#[test]
fn test_web_config() {
    let config = WebConfig::new("127.0.0.1", 9090)
        .unwrap()
        .with_cors(false)
        .with_max_subscribers(50);

    assert!(!config.cors);
    assert_eq!(config.max_subscribers, 50);
    assert_eq!(config.bind.to_string(), "127.0.0.1:9090");
}

#[test]
fn test_monitor_config_builder() {
    let config = MonitorConfig::default()
        .with_interval_ms(500)
        .with_history_capacity(120);

    assert_eq!(config.interval.as_millis(), 500);
    assert_eq!(config.history_capacity, 120);
    assert!(config.validate().is_ok());
}
