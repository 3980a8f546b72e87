//! Web server and API endpoints for the system monitor dashboard.
//!
//! Exposes the history ring and on-demand sampling over REST, and registers
//! WebSocket clients with the broadcast hub for live updates.

pub mod config;
pub mod handlers;
pub mod router;
pub mod websocket;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;

use crate::error::{Result, SystemError};
use crate::hub::HubHandle;
use crate::metrics::{HistoryRing, SnapshotSource};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Snapshot source shared between request handlers.
pub type SharedSource = Arc<Mutex<dyn SnapshotSource>>;

/// State shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub source: SharedSource,
    pub ring: Arc<HistoryRing>,
    pub hub: HubHandle,
    pub max_subscribers: usize,
}

impl AppState {
    pub fn new(source: SharedSource, ring: Arc<HistoryRing>, hub: HubHandle) -> Self {
        Self {
            source,
            ring,
            hub,
            max_subscribers: config::DEFAULT_MAX_SUBSCRIBERS,
        }
    }

    pub fn with_max_subscribers(mut self, max: usize) -> Self {
        self.max_subscribers = max;
        self
    }
}

/// Serve the dashboard until `shutdown` is cancelled.
pub async fn start_web_server(
    config: WebConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<()> {
    let state = state.with_max_subscribers(config.max_subscribers);
    let app = create_app(&config, state);

    let addr = config.bind;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| SystemError::web_server_error(format!("Failed to bind to address: {}", e)))?;

    info!("Starting system monitor web server on http://{}", addr);
    info!("API endpoints: http://{0}/api/metrics, http://{0}/api/history", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| SystemError::web_server_error(format!("Server error: {}", e)))?;

    info!("Web server stopped");
    Ok(())
}
