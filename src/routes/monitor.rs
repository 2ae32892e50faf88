//! # routes::monitor
//!
//! **Live stream**: the WebSocket replacement for the dashboard's
//! subscription hooks.
//!
//! `ws://host/ws/stream?channels=stock:TCS,positions,funds`
//!
//! * Without `channels`, the client gets every instrument plus the four
//!   portfolio channels.
//! * The first frame is a `SNAPSHOT` of current state; after that each
//!   published [`MarketEvent`](crate::events::MarketEvent) arrives as one JSON
//!   text frame.
//! * Each client has a bounded queue.  A client that stops reading loses
//!   frames rather than growing it; the gap is logged once it catches up.
//! * Closing the socket drops the subscriptions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    bus::Subscription,
    error::AppError,
    events::{Channel, MarketEvent},
    market::Market,
    state::SharedState,
};

/// Frames held per client before new ones are dropped.
pub const STREAM_BUFFER: usize = 256;

#[derive(Debug, Default, Deserialize)]
pub struct StreamParams {
    /// Comma-separated channel names.
    pub channels: Option<String>,
}

/// Resolves the requested channel list; `None` or blank means everything.
pub fn parse_channels(raw: Option<&str>, market: &Market) -> Result<Vec<Channel>, AppError> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(market.channels());
    };

    let mut channels = Vec::new();
    for name in raw.split(',').filter(|n| !n.trim().is_empty()) {
        let channel: Channel = name.parse()?;
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    Ok(channels)
}

/// GET /ws/stream
pub async fn ws_stream(
    ws: WebSocketUpgrade,
    Query(params): Query<StreamParams>,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let channels = parse_channels(params.channels.as_deref(), &state.market)?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, channels)))
}

/// Queues one client's frames without ever blocking the publisher.  While
/// the queue is full, new frames are dropped and counted in `lagged`.
fn forwarder(
    tx: mpsc::Sender<String>,
    conn_id: Uuid,
    lagged: Arc<AtomicU64>,
) -> impl Fn(&MarketEvent) + Send + Sync + 'static {
    move |event: &MarketEvent| match tx.try_send(event.to_json()) {
        Ok(()) | Err(TrySendError::Closed(_)) => {}
        Err(TrySendError::Full(_)) => {
            lagged.fetch_add(1, Ordering::Relaxed);
            debug!(%conn_id, channel = %event.channel(), "stream client lagging, frame dropped");
        }
    }
}

async fn handle_socket(socket: WebSocket, state: SharedState, channels: Vec<Channel>) {
    let conn_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<String>(STREAM_BUFFER);
    let lagged = Arc::new(AtomicU64::new(0));

    // Listeners only enqueue; the socket is written from this task.
    let subscriptions: Vec<Subscription> = channels
        .into_iter()
        .map(|channel| {
            state
                .market
                .subscribe(channel, forwarder(tx.clone(), conn_id, Arc::clone(&lagged)))
        })
        .collect();
    drop(tx);

    let (mut sender, mut receiver) = socket.split();
    info!(%conn_id, channels = subscriptions.len(), "stream client connected");

    let snapshot = {
        let market = &state.market;
        json!({
            "event":       "SNAPSHOT",
            "channels":    subscriptions.iter().map(|s| s.channel().to_string()).collect::<Vec<_>>(),
            "instruments": market.instruments(),
            "positions":   market.positions(),
            "holdings":    market.holdings(),
            "orders":      market.orders(),
            "funds":       market.funds(),
        })
        .to_string()
    };

    if sender.send(Message::Text(snapshot.into())).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            frame = rx.recv() => {
                let Some(frame) = frame else { break };
                if sender.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
                let skipped = lagged.swap(0, Ordering::Relaxed);
                if skipped > 0 {
                    warn!(%conn_id, skipped, "stream client lagged, frames dropped");
                }
            }

            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sender.send(Message::Pong(data)).await;
                    }
                    Some(Err(e)) => {
                        debug!(%conn_id, error = %e, "stream read error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    drop(subscriptions);
    info!(%conn_id, "stream client disconnected");
}
