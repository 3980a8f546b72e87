//! System Monitor binary.
//!
//! Samples host metrics on an interval and serves them over HTTP and WebSocket.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use system_monitor::{
    start_web_server, AppState, BroadcastHub, CollectionLoop, HistoryRing, MonitorConfig,
    Snapshot, SnapshotSource, SystemCollector, WebConfig, DEFAULT_HISTORY_SIZE,
    DEFAULT_INTERVAL_MS, DEFAULT_WEB_PORT, SHUTDOWN_GRACE,
};
use system_monitor::web::config::DEFAULT_MAX_SUBSCRIBERS;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "system_monitor")]
#[command(about = "Real-time host metrics dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = "Samples host metrics on a fixed interval, keeps a rolling history and streams every sample to connected browsers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Metrics collection interval in milliseconds
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    interval: u64,

    /// Number of historical data points to keep (non-positive uses the default)
    #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE as i64, allow_negative_numbers = true)]
    history: i64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve(ServeArgs),

    /// Take a single snapshot and exit
    Snapshot(SnapshotArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Static files directory (optional)
    #[arg(long)]
    static_dir: Option<String>,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,

    /// Maximum WebSocket connections
    #[arg(long, default_value_t = DEFAULT_MAX_SUBSCRIBERS)]
    max_connections: usize,
}

#[derive(Args)]
struct SnapshotArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await,
        Some(Commands::Snapshot(args)) => snapshot_command(args).await,
        None => {
            let serve_args = ServeArgs {
                max_connections: DEFAULT_MAX_SUBSCRIBERS,
                ..Default::default()
            };
            serve_command(&cli, &serve_args).await
        }
    }
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    Ok(())
}

fn monitor_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let config = MonitorConfig::default()
        .with_interval_ms(cli.interval)
        .with_history_capacity(cli.history);
    config.validate()?;
    Ok(config)
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    let config = monitor_config(cli)?;

    info!("Starting system monitor on port {}", cli.port);
    info!("Collection interval: {:?}", config.interval);
    info!("History size: {} data points", config.history_capacity);

    let ring = Arc::new(HistoryRing::new(config.history_capacity));
    let hub = BroadcastHub::spawn(Arc::clone(&ring));
    let cancel = CancellationToken::new();

    let collection = CollectionLoop::new(
        SystemCollector::new(),
        Arc::clone(&ring),
        hub.clone(),
        config.interval,
    )
    .spawn(cancel.clone());

    let mut web_config = WebConfig::new(&cli.host, cli.port)?
        .with_cors(!args.no_cors)
        .with_max_subscribers(args.max_connections);
    if let Some(static_dir) = &args.static_dir {
        web_config = web_config.with_static_dir(Some(PathBuf::from(static_dir)));
    }

    // On-demand requests get their own probe so they never shorten the loop's CPU window
    let state = AppState::new(
        Arc::new(Mutex::new(SystemCollector::new())),
        Arc::clone(&ring),
        hub.clone(),
    );
    let mut server = tokio::spawn(start_web_server(web_config, state, cancel.clone()));

    println!("\nSystem Monitor is running at http://localhost:{}", cli.port);
    println!("Press Ctrl+C to stop");

    let server_result = tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutting down server...");
            None
        }
        result = &mut server => Some(result),
    };

    cancel.cancel();

    let graceful = async {
        hub.shutdown().await;
        if let Err(e) = collection.await {
            warn!("Collection loop ended abnormally: {}", e);
        }
        match server_result {
            Some(result) => result,
            None => server.await,
        }
    };

    match tokio::time::timeout(SHUTDOWN_GRACE, graceful).await {
        Ok(Ok(Ok(()))) => info!("Server stopped"),
        Ok(Ok(Err(e))) => {
            error!("Server error: {}", e);
            return Err(e.into());
        }
        Ok(Err(e)) => return Err(anyhow::anyhow!("web server task failed: {}", e)),
        Err(_) => warn!("Graceful shutdown exceeded {:?}, forcing exit", SHUTDOWN_GRACE),
    }

    Ok(())
}

async fn snapshot_command(args: &SnapshotArgs) -> anyhow::Result<()> {
    let mut collector = SystemCollector::new();
    let snapshot = collector.sample().await?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        "pretty" => print_pretty_snapshot(&snapshot),
        other => anyhow::bail!("Unsupported format: {}. Use 'json' or 'pretty'", other),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0 / 1024.0
}

fn print_pretty_snapshot(snapshot: &Snapshot) {
    println!(
        "System Snapshot ({})",
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("==========================================");
    println!();

    println!("CPU:");
    println!("  Cores: {}", snapshot.cpu.cores);
    println!("  Usage: {:.1}%", snapshot.cpu.total_percent);
    if let [one, five, fifteen] = snapshot.cpu.load_avg.as_slice() {
        println!("  Load: {:.2}, {:.2}, {:.2}", one, five, fifteen);
    }
    println!();

    println!("Memory:");
    println!("  Total: {:.1} GB", gib(snapshot.memory.total));
    println!("  Available: {:.1} GB", gib(snapshot.memory.available));
    println!("  Usage: {:.1}%", snapshot.memory.used_percent);
    println!(
        "  Swap: {:.1} GB used ({:.1}%)",
        gib(snapshot.memory.swap_used),
        snapshot.memory.swap_percent
    );
    println!();

    if !snapshot.disk.is_empty() {
        println!("Disks:");
        for disk in &snapshot.disk {
            println!(
                "  {} ({}): {:.1} GB total, {:.1}% used",
                disk.mountpoint,
                disk.fstype,
                gib(disk.total),
                disk.used_percent
            );
        }
        println!();
    }

    if !snapshot.network.is_empty() {
        println!("Network:");
        for iface in &snapshot.network {
            println!(
                "  {}: TX {:.1} MB, RX {:.1} MB",
                iface.name,
                iface.bytes_sent as f64 / 1024.0 / 1024.0,
                iface.bytes_recv as f64 / 1024.0 / 1024.0
            );
        }
        println!();
    }

    if !snapshot.temperature.is_empty() {
        println!("Temperature:");
        for sensor in &snapshot.temperature {
            println!("  {}: {:.1}°C", sensor.sensor_key, sensor.temperature);
        }
        println!();
    }

    println!("System:");
    println!("  Hostname: {}", snapshot.system.hostname);
    println!(
        "  OS: {} ({} {})",
        snapshot.system.os, snapshot.system.platform, snapshot.system.platform_version
    );
    println!("  Kernel: {}", snapshot.system.kernel_version);
    println!("  Uptime: {} seconds", snapshot.system.uptime);
    println!("  Processes: {}", snapshot.system.processes);
}
