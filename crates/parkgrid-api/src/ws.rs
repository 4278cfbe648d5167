//! `WebSocket` handler for real-time spot status streaming.
//!
//! Clients connect to `GET /ws/lots/:lot_id` and receive a
//! JSON-encoded [`StatusChange`] frame for every mutation committed in
//! that lot after the connection was established. The handler uses a
//! [`broadcast::Receiver`](tokio::sync::broadcast::Receiver) obtained
//! from the registry, so all clients of a lot see the same ordered
//! stream.
//!
//! If a client falls behind, lagged messages are silently skipped and
//! the client resumes from the most recent change.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use parkgrid_types::{LotId, StatusChange};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` connection and begin
/// streaming status changes for one lot.
///
/// # Route
///
/// `GET /ws/lots/:lot_id`
///
/// # Errors
///
/// 404 before the upgrade when the lot id is unknown.
pub async fn ws_lot(
    ws: WebSocketUpgrade,
    Path(lot_id): Path<LotId>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    // Subscribe before upgrading so an unknown lot is a plain 404.
    let rx = state.registry.subscribe(lot_id).await?;
    Ok(ws.on_upgrade(move |socket| handle_ws(socket, lot_id, rx)))
}

/// Handle the `WebSocket` lifecycle: forward each committed status
/// change as a text frame until either side disconnects.
async fn handle_ws(
    mut socket: WebSocket,
    lot_id: LotId,
    mut rx: broadcast::Receiver<StatusChange>,
) {
    debug!(%lot_id, "WebSocket client connected");

    loop {
        tokio::select! {
            // Receive a committed status change for this lot.
            result = rx.recv() => {
                match result {
                    Ok(change) => {
                        let json = match serde_json::to_string(&change) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!(%lot_id, "Failed to serialize status change: {e}");
                                continue;
                            }
                        };
                        let msg: Message = Message::Text(json.into());
                        if socket.send(msg).await.is_err() {
                            debug!(%lot_id, "WebSocket client disconnected (send failed)");
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        debug!(%lot_id, skipped = n, "WebSocket client lagged, skipping ahead");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(%lot_id, "Broadcast channel closed, shutting down WebSocket");
                        return;
                    }
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%lot_id, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let pong = Message::Pong(data);
                        if socket.send(pong).await.is_err() {
                            debug!(%lot_id, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%lot_id, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Ignore other message types (text, binary from client).
                    }
                }
            }
        }
    }
}
