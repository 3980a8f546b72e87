//! HTTP handlers for API endpoints.

use crate::metrics::Snapshot;
use crate::web::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use serde_json::json;
use tracing::error;

/// Take a fresh sample on demand.
pub async fn get_metrics(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, (StatusCode, String)> {
    let mut source = state.source.lock().await;

    match source.sample().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to collect snapshot: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Stored history, oldest first.
pub async fn get_history(State(state): State<AppState>) -> Json<Vec<Snapshot>> {
    Json(state.ring.get_history())
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let subscribers = state.hub.stats().await.unwrap_or_default();

    Json(json!({
        "status": "ok",
        "service": "system-monitor",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "history_size": state.ring.size(),
        "subscribers": subscribers,
    }))
}

/// Serve a built-in dashboard when no static index is available.
pub async fn default_index() -> Html<&'static str> {
    Html(DEFAULT_INDEX_HTML)
}

const DEFAULT_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>System Monitor</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: #1e1e2e;
            color: #cdd6f4;
            margin: 0;
            padding: 20px;
        }
        .dashboard {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(280px, 1fr));
            gap: 16px;
            max-width: 1200px;
            margin: 0 auto;
        }
        .card {
            background: #313244;
            border-radius: 10px;
            padding: 20px;
        }
        .card h3 { margin-top: 0; color: #89b4fa; }
        .metric { display: flex; justify-content: space-between; padding: 4px 0; }
        .status { text-align: center; margin: 20px; }
    </style>
</head>
<body>
    <h1 style="text-align:center">System Monitor</h1>
    <div class="status" id="status">Connecting...</div>
    <div class="dashboard">
        <div class="card"><h3>CPU</h3>
            <div class="metric"><span>Usage</span><span id="cpu-usage">-</span></div>
            <div class="metric"><span>Cores</span><span id="cpu-cores">-</span></div>
            <div class="metric"><span>Load</span><span id="cpu-load">-</span></div>
        </div>
        <div class="card"><h3>Memory</h3>
            <div class="metric"><span>Used</span><span id="mem-used">-</span></div>
            <div class="metric"><span>Total</span><span id="mem-total">-</span></div>
            <div class="metric"><span>Swap</span><span id="mem-swap">-</span></div>
        </div>
        <div class="card"><h3>System</h3>
            <div class="metric"><span>Host</span><span id="hostname">-</span></div>
            <div class="metric"><span>Platform</span><span id="platform">-</span></div>
            <div class="metric"><span>Uptime</span><span id="uptime">-</span></div>
            <div class="metric"><span>Processes</span><span id="processes">-</span></div>
        </div>
        <div class="card"><h3>Disks</h3><div id="disks"></div></div>
        <div class="card"><h3>Network</h3><div id="network"></div></div>
    </div>
    <script>
        const history = [];

        function formatBytes(bytes) {
            const sizes = ['B', 'KB', 'MB', 'GB', 'TB'];
            if (!bytes) return '0 B';
            const i = Math.floor(Math.log(bytes) / Math.log(1024));
            return `${(bytes / Math.pow(1024, i)).toFixed(1)} ${sizes[i]}`;
        }

        function formatUptime(seconds) {
            const days = Math.floor(seconds / 86400);
            const hours = Math.floor((seconds % 86400) / 3600);
            const minutes = Math.floor((seconds % 3600) / 60);
            return days > 0 ? `${days}d ${hours}h ${minutes}m` : `${hours}h ${minutes}m`;
        }

        function rows(items, render) {
            return items.map(item => `<div class="metric">${render(item)}</div>`).join('');
        }

        function update(data) {
            history.push(data);
            if (history.length > 60) history.shift();

            document.getElementById('cpu-usage').textContent = `${data.cpu.total_percent.toFixed(1)}%`;
            document.getElementById('cpu-cores').textContent = data.cpu.cores;
            document.getElementById('cpu-load').textContent = (data.cpu.load_avg || []).map(l => l.toFixed(2)).join(', ') || 'n/a';
            document.getElementById('mem-used').textContent = `${data.memory.used_percent.toFixed(1)}%`;
            document.getElementById('mem-total').textContent = formatBytes(data.memory.total);
            document.getElementById('mem-swap').textContent = `${data.memory.swap_percent.toFixed(1)}%`;
            document.getElementById('hostname').textContent = data.system.hostname;
            document.getElementById('platform').textContent = `${data.system.platform} ${data.system.platform_version}`;
            document.getElementById('uptime').textContent = formatUptime(data.system.uptime);
            document.getElementById('processes').textContent = data.system.processes;
            document.getElementById('disks').innerHTML = rows(data.disk || [],
                d => `<span>${d.mountpoint}</span><span>${d.used_percent.toFixed(1)}%</span>`);
            document.getElementById('network').innerHTML = rows(data.network || [],
                n => `<span>${n.name}</span><span>${formatBytes(n.bytes_recv)} / ${formatBytes(n.bytes_sent)}</span>`);
        }

        function connect() {
            const protocol = window.location.protocol === 'https:' ? 'wss:' : 'ws:';
            const ws = new WebSocket(`${protocol}//${window.location.host}/ws`);
            ws.onopen = () => document.getElementById('status').textContent = 'Connected';
            ws.onmessage = event => update(JSON.parse(event.data));
            ws.onclose = () => {
                document.getElementById('status').textContent = 'Disconnected, retrying...';
                setTimeout(connect, 2000);
            };
        }

        connect();
    </script>
</body>
</html>"#;
