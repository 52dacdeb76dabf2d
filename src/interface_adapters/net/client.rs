use crate::interface_adapters::broadcast::{Broadcaster, Subscription};
use crate::interface_adapters::state::AppState;

use axum::{
    Error,
    extract::{
        State,
        ws::{Message, Utf8Bytes, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::SinkExt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let broadcaster = state.broadcaster.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, broadcaster))
}

// Per-connection traffic counters, reported on disconnect.
#[derive(Debug, Default)]
struct ConnCtx {
    msgs_in: u64,
    msgs_out: u64,
    bytes_out: u64,
}

enum LoopControl {
    Continue,
    Disconnect,
}

async fn handle_socket(mut socket: WebSocket, broadcaster: Arc<Broadcaster>) {
    // Register before the first await so no event published after the upgrade is missed.
    let Subscription { id: conn_id, mut rx } = broadcaster.subscribe();
    let span = info_span!("conn", conn_id);

    async move {
        info!(viewers = broadcaster.subscriber_count(), "viewer connected");
        let mut ctx = ConnCtx::default();

        loop {
            let control = tokio::select! {
                incoming = socket.recv() => handle_incoming_ws(incoming, &mut ctx),
                frame = rx.recv() => match frame {
                    Some(bytes) => forward_event_bytes(bytes, &mut socket, &mut ctx).await,
                    // Unregistered from elsewhere.
                    None => LoopControl::Disconnect,
                },
            };

            if let LoopControl::Disconnect = control {
                break;
            }
        }

        broadcaster.unsubscribe(conn_id);
        if let Err(err) = socket.close().await {
            debug!(error = %err, "socket close error");
        }
        info!(
            msgs_in = ctx.msgs_in,
            msgs_out = ctx.msgs_out,
            bytes_out = ctx.bytes_out,
            "viewer disconnected"
        );
    }
    .instrument(span)
    .await;
}

// Viewers are receive-only; anything they send is counted and ignored.
fn handle_incoming_ws(incoming: Option<Result<Message, Error>>, ctx: &mut ConnCtx) -> LoopControl {
    match incoming {
        Some(Ok(Message::Text(_) | Message::Binary(_))) => {
            ctx.msgs_in += 1;
            LoopControl::Continue
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => LoopControl::Continue,
        Some(Ok(Message::Close(_))) | None => LoopControl::Disconnect,
        Some(Err(err)) => {
            debug!(error = %err, "websocket receive error");
            LoopControl::Disconnect
        }
    }
}

async fn forward_event_bytes(
    bytes: Utf8Bytes,
    socket: &mut WebSocket,
    ctx: &mut ConnCtx,
) -> LoopControl {
    let len = bytes.len();
    match socket.send(Message::Text(bytes)).await {
        Ok(()) => {
            ctx.msgs_out += 1;
            ctx.bytes_out += len as u64;
            LoopControl::Continue
        }
        Err(err) => {
            warn!(error = %err, "failed to send event");
            LoopControl::Disconnect
        }
    }
}
