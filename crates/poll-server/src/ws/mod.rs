//! WebSocket duplex endpoint
//!
//! Handles the audience connection lifecycle: register with the connection
//! registry on upgrade, pump queued frames out, answer `ping` keepalives,
//! and deregister on close. No other client→server payload is interpreted.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::Uri,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::connection::{Peer, DEFAULT_CHANNEL};
use crate::state::AppState;

/// Buffer size for a peer's outbound frame queue
const FRAME_BUFFER_SIZE: usize = 100;

/// Handshake query parameters
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Broadcast channel to join; defaults to the voting channel
    channel: Option<String>,
    /// Optional caller-supplied user id
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    uri: Uri,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    ws.on_upgrade(move |socket| handle_socket(state, socket, path, query))
}

/// Drive one upgraded connection until either side goes away
async fn handle_socket(state: AppState, socket: WebSocket, path: String, query: WsQuery) {
    let peer_id = Peer::generate_id();
    let channel = query
        .channel
        .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

    let (frames_tx, mut frames_rx) = mpsc::channel::<String>(FRAME_BUFFER_SIZE);
    let peer = Peer::new(
        peer_id.clone(),
        path,
        channel,
        query.user_id,
        frames_tx.clone(),
    );

    state.registry().open(peer).await;

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Pump queued frames out to the socket
    let peer_id_send = peer_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(frame) = frames_rx.recv().await {
            if ws_sink.send(Message::Text(frame)).await.is_err() {
                tracing::debug!(peer_id = %peer_id_send, "Socket send failed");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Read from the socket; only the literal `ping` keepalive is understood
    let peer_id_recv = peer_id.clone();
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if text == "ping" && frames_tx.send("pong".to_string()).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::debug!(peer_id = %peer_id_recv, "Client closed connection");
                    break;
                }
                Ok(_) => {
                    // control frames are handled by axum; binary is ignored
                }
                Err(e) => {
                    tracing::warn!(peer_id = %peer_id_recv, error = %e, "WebSocket error");
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }

    state.registry().close(&peer_id).await;
}
