//! WebSocket connection lifecycle.
//!
//! Registers the socket, relays its text messages to every connection and
//! forwards queued broadcasts until the peer closes or goes silent.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use tokio::time::{Instant, MissedTickBehavior};

use crate::state::AppState;

/// Handle an established WebSocket connection.
pub(crate) async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let registry = &state.registry;
    let idle_timeout = state.ws_idle_timeout;
    let (id, mut outbound) = registry.register();

    let mut ping = tokio::time::interval_at(Instant::now() + idle_timeout / 2, idle_timeout / 2);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);

    loop {
        tokio::select! {
            Some(text) = outbound.recv() => {
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        idle.as_mut().reset(Instant::now() + idle_timeout);
                        let delivered = registry.broadcast_all(text.as_str());
                        tracing::debug!(connection = %id, clients = delivered, "Relayed client message");
                    }
                    Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                    Some(Ok(_)) => idle.as_mut().reset(Instant::now() + idle_timeout),
                }
            }
            _ = ping.tick() => {
                if socket.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            () = &mut idle => {
                tracing::debug!(connection = %id, "WebSocket connection idle, closing");
                let _ = socket.send(Message::Close(None)).await;
                break;
            }
        }
    }

    registry.unregister(id);
}
