//! WebSocket transport for the broadcast hub.

use crate::error::{Result, SystemError};
use crate::hub::Subscriber;
use crate::metrics::Snapshot;
use crate::web::AppState;
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

/// Write half of a WebSocket, registered with the hub as a subscriber.
///
/// Each snapshot goes out as one JSON text frame.
pub struct WebSocketSubscriber {
    sink: SplitSink<WebSocket, Message>,
}

impl WebSocketSubscriber {
    pub fn new(sink: SplitSink<WebSocket, Message>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl Subscriber for WebSocketSubscriber {
    async fn send(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_string(snapshot)?;
        self.sink
            .send(Message::Text(json))
            .await
            .map_err(|e| SystemError::delivery_error(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
        let _ = self.sink.close().await;
    }
}

/// WebSocket upgrade handler.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let connected = state.hub.subscriber_count().await;
    if connected >= state.max_subscribers {
        warn!(
            "Rejecting WebSocket client: {} of {} connections in use",
            connected, state.max_subscribers
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Register the write half with the hub and watch the read half for disconnect.
async fn handle_websocket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();

    let id = match state.hub.register(WebSocketSubscriber::new(sender)).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Refusing WebSocket client: {}", e);
            return;
        }
    };

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => debug!("Ignoring message from {}: {}", id, text),
            Ok(_) => {}
            Err(e) => {
                debug!("WebSocket read error for client {}: {}", id, e);
                break;
            }
        }
    }

    state.hub.unregister(id);
    info!("WebSocket client {} went away", id);
}
