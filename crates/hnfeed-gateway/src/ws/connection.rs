use axum::{
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use hnfeed_core::{config::MAX_PAYLOAD_BYTES, ConnId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::ws::{dispatch, send, subscriber::WsSubscriber};

/// Axum handler: upgrades HTTP to WebSocket at GET /updates.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(MAX_PAYLOAD_BYTES)
        .on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection event loop; lives for the entire WS session.
///
/// The connection is registered with the hub before the hello frame goes
/// out and unregistered on every exit path, so a closed socket never stays
/// in any group.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = ConnId::new();
    info!(%conn_id, "new updates connection");

    let (mut tx, mut rx) = socket.split();
    let (out_tx, mut out_rx) = mpsc::channel::<String>(state.config.gateway.ws_outbound_buffer.max(1));
    let closed = CancellationToken::new();
    let subscriber = Arc::new(WsSubscriber::new(conn_id.clone(), out_tx, closed.clone()));
    state.hub.on_connect(subscriber.clone());

    let hello = send::hello_event(&conn_id, state.hub.groups_of(&conn_id));
    if send::text(&mut tx, hello.to_json()).await.is_err() {
        state.hub.on_disconnect(&conn_id);
        return;
    }

    let ping_every = Duration::from_secs(state.config.gateway.ws_ping_interval_secs.max(1));
    let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + ping_every, ping_every);
    ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > MAX_PAYLOAD_BYTES {
                            warn!(%conn_id, size = text.len(), "payload too large");
                            break;
                        }
                        let reply = dispatch::handle_text(&conn_id, text.as_str(), &subscriber, &state.hub);
                        if let Some(res) = reply {
                            if send::text(&mut tx, res.to_json()).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if tx.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(%conn_id, error = %e, "socket read failed");
                        break;
                    }
                    _ => {}
                }
            }

            Some(frame) = out_rx.recv() => {
                if send::text(&mut tx, frame).await.is_err() {
                    break;
                }
            }

            _ = closed.cancelled() => {
                let _ = tx.send(Message::Close(None)).await;
                break;
            }

            _ = ping.tick() => {
                if tx.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.hub.on_disconnect(&conn_id);
    info!(%conn_id, "updates connection closed");
}
