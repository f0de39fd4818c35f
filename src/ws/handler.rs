//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::server::{Outbox, ServerEvent};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::ws::protocol::{ClientMsg, ConnectionId, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let connection_id: ConnectionId = Uuid::new_v4();
    info!(connection_id = %connection_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();
    let outbound_rx = state.hub.register(connection_id);

    if !state.server.send(ServerEvent::Connected(connection_id)).await {
        error!(connection_id = %connection_id, "Game server is not running");
        state.hub.unregister(&connection_id);
        return;
    }

    run_session(connection_id, &state, ws_sink, ws_stream, outbound_rx).await;

    // Cleanup on disconnect
    state
        .server
        .send(ServerEvent::Disconnected(connection_id))
        .await;
    state.hub.unregister(&connection_id);

    info!(connection_id = %connection_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    connection_id: ConnectionId,
    state: &AppState,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut outbound_rx: mpsc::Receiver<ServerMsg>,
) {
    let rate_limiter = ConnectionRateLimiter::new(state.config.input_rate_limit);

    // Spawn writer task: server messages -> WebSocket
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(connection_id = %connection_id, error = %e, "WebSocket send failed");
                break;
            }
        }
        let _ = ws_sink.close().await;
    });

    // Reader loop: WebSocket -> game server
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(connection_id = %connection_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        let event = ServerEvent::Message { connection_id, msg };
                        if !state.server.send(event).await {
                            debug!(connection_id = %connection_id, "Game server stopped");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(connection_id = %connection_id, error = %e, "Failed to parse client message");
                        state
                            .hub
                            .send(connection_id, ServerMsg::error(format!("Malformed message: {e}")));
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(connection_id = %connection_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(connection_id = %connection_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(connection_id = %connection_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(connection_id = %connection_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
