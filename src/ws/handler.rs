//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::game::ports::{PlayerId, Position};
use crate::util::rate_limit::ConnectionRateLimiter;
use crate::util::time::unix_millis;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Display name shown to other players
    pub name: Option<String>,
}

/// What the reader loop should do after a client message
#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Reply(ServerMsg),
    Close,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let display_name = query
        .name
        .map(|n| n.trim().chars().take(32).collect::<String>())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Player".to_string());

    ws.on_upgrade(move |socket| handle_socket(socket, display_name, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, display_name: String, state: AppState) {
    let (mut ws_sink, ws_stream) = socket.split();

    // Subscribe before joining so no broadcast is missed
    let events_rx = state.broadcaster.subscribe();
    let player_id = state.arena.join(display_name.clone());
    info!(player_id = %player_id, display_name = %display_name, "New WebSocket connection");

    let welcome = ServerMsg::Welcome {
        player_id,
        server_time: unix_millis(),
        phase: state.broadcaster.phase(),
    };

    if let Err(e) = send_msg(&mut ws_sink, &welcome).await {
        error!(player_id = %player_id, error = %e, "Failed to send welcome");
        state.disconnect(player_id);
        return;
    }

    run_session(player_id, &state, ws_sink, ws_stream, events_rx).await;

    // Cleanup on disconnect; the round may already have dropped this player
    state.disconnect(player_id);

    info!(player_id = %player_id, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    player_id: PlayerId,
    state: &AppState,
    mut ws_sink: futures::stream::SplitSink<WebSocket, Message>,
    mut ws_stream: futures::stream::SplitStream<WebSocket>,
    mut events_rx: broadcast::Receiver<ServerMsg>,
) {
    let rate_limiter = ConnectionRateLimiter::new();
    let (reply_tx, mut reply_rx) = tokio::sync::mpsc::channel::<ServerMsg>(16);

    // Spawn writer task: session broadcasts and direct replies -> WebSocket
    let writer_handle = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                event = events_rx.recv() => match event {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(player_id = %player_id, lagged_count = n, "Client lagged, skipping events");
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!(player_id = %player_id, "Event channel closed");
                        break;
                    }
                },
                reply = reply_rx.recv() => match reply {
                    Some(msg) => msg,
                    None => break,
                },
            };

            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(player_id = %player_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> arena
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_message() {
                    warn!(player_id = %player_id, "Rate limited client message");
                    continue;
                }

                let flow = match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(client_msg) => apply_client_msg(state, player_id, client_msg),
                    Err(e) => {
                        warn!(player_id = %player_id, error = %e, "Failed to parse client message");
                        Flow::Reply(ServerMsg::Error {
                            code: "bad_message".to_string(),
                            message: e.to_string(),
                        })
                    }
                };

                match flow {
                    Flow::Continue => {}
                    Flow::Reply(msg) => {
                        if reply_tx.send(msg).await.is_err() {
                            break;
                        }
                    }
                    Flow::Close => break,
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(player_id = %player_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(player_id = %player_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(player_id = %player_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    writer_handle.abort();
}

fn apply_client_msg(state: &AppState, player_id: PlayerId, msg: ClientMsg) -> Flow {
    match msg {
        ClientMsg::Move { x, y, z } => {
            if ![x, y, z].iter().all(|c| c.is_finite()) {
                return Flow::Reply(ServerMsg::Error {
                    code: "bad_position".to_string(),
                    message: "position must be finite".to_string(),
                });
            }
            state.arena.update_position(player_id, Position::new(x, y, z));
            Flow::Continue
        }
        ClientMsg::Ping { t } => Flow::Reply(ServerMsg::Pong { t }),
        ClientMsg::Leave => Flow::Close,
    }
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
