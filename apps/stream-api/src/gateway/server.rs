//! WebSocket upgrade handlers for the room side channel and overlay feeds.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use tipcast_common::id::{prefix, prefixed_ulid};

use crate::tips::feed::TipFeed;
use crate::AppState;

use super::events::{describe, EventName, OverlayFrame};
use super::fanout::DataChannel;
use super::session::OverlaySession;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rooms/{room_id}/data", get(data_upgrade))
        .route("/rooms/{room_id}/overlay", get(overlay_upgrade))
}

async fn data_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_data_connection(socket, state, room_id))
}

async fn overlay_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_overlay_connection(socket, state, room_id))
}

/// Relay loop: frames from the client go into the room, room messages go
/// back out as binary frames.
async fn handle_data_connection(socket: WebSocket, state: AppState, room_id: String) {
    let participant_id = prefixed_ulid(prefix::PARTICIPANT);
    let channel = state.rooms.channel(&room_id, &participant_id);
    let mut room_rx = channel.subscribe();
    let (mut ws_tx, mut ws_rx) = socket.split();

    tracing::info!(%room_id, %participant_id, "room participant joined");

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                let payload = match msg {
                    Some(Ok(Message::Binary(bytes))) => bytes.to_vec(),
                    Some(Ok(Message::Text(text))) => text.as_str().as_bytes().to_vec(),
                    Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, %participant_id, "ws read error");
                        break;
                    }
                };
                if let Err(e) = channel.send(payload).await {
                    tracing::debug!(error = %e, %participant_id, "room publish failed");
                }
            }

            result = room_rx.recv() => {
                match result {
                    Ok(message) => {
                        let frame = Message::Binary(message.payload.clone().into());
                        if ws_tx.send(frame).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%room_id, %participant_id, skipped = n, "room participant lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    drop(room_rx);
    state.rooms.release(&room_id);
    tracing::info!(%room_id, %participant_id, "room participant left");
}

/// Overlay loop: run a tip feed for this connection and push its events as
/// JSON frames until the client goes away.
async fn handle_overlay_connection(socket: WebSocket, state: AppState, room_id: String) {
    let session = OverlaySession::new(room_id);
    let channel = state.rooms.channel(&session.room_id, &session.session_id);
    let (feed, mut events) = TipFeed::spawn(&channel, &state.config.notifications);
    let (mut ws_tx, mut ws_rx) = socket.split();

    tracing::info!(
        session_id = %session.session_id,
        room_id = %session.room_id,
        "overlay session established"
    );

    let ready = json!({ "sessionId": session.session_id, "roomId": session.room_id });
    if send_frame(&mut ws_tx, &session, EventName::READY, ready).await {
        loop {
            tokio::select! {
                msg = ws_rx.next() => match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(?e, session_id = %session.session_id, "ws read error");
                        break;
                    }
                    // Overlays are receive-only.
                    Some(Ok(_)) => continue,
                },

                event = events.recv() => {
                    let Some(event) = event else { break };
                    let (name, data) = match describe(&event) {
                        Ok(described) => described,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize overlay event");
                            continue;
                        }
                    };
                    if !send_frame(&mut ws_tx, &session, name, data).await {
                        break;
                    }
                }
            }
        }
    }

    // The feed's subscription is gone once its task has returned.
    let pipeline = feed.shutdown().await;
    state.rooms.release(&session.room_id);
    if let Some(pipeline) = pipeline {
        tracing::info!(
            session_id = %session.session_id,
            room_id = %session.room_id,
            shown = pipeline.chat().len(),
            "overlay session ended"
        );
    }
}

/// Returns false once the client can no longer be written to.
async fn send_frame(
    ws_tx: &mut SplitSink<WebSocket, Message>,
    session: &OverlaySession,
    event_name: &'static str,
    data: Value,
) -> bool {
    let frame = OverlayFrame::dispatch(event_name, session.next_seq(), data);
    match serde_json::to_string(&frame) {
        Ok(json) => ws_tx.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize overlay frame");
            true
        }
    }
}

