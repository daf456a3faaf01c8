// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fan-out WebSocket — streams hit-count and session events to
//! subscribed clients over `/ws/events`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::state::FeedState;
use crate::transport::auth;

/// Query parameters for the events WebSocket.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Auth token.
    pub token: Option<String>,
    /// Restrict the stream to one user id (default: all users).
    #[serde(default)]
    pub user: Option<String>,
}

/// `GET /ws/events` — WebSocket upgrade for the event stream.
pub async fn ws_events_handler(
    State(state): State<Arc<FeedState>>,
    Query(query): Query<EventsQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // The upgrade request cannot carry a bearer header, so the token rides in
    // the query string.
    if !auth::ws_token_ok(query.token.as_deref(), state.config.auth_token.as_deref()) {
        return crate::error::FeedError::Unauthorized
            .to_http_response("token query parameter required")
            .into_response();
    }

    ws.on_upgrade(move |socket| handle_events_connection(state, query.user, socket))
        .into_response()
}

/// Per-connection loop: forward matching events until either side closes.
async fn handle_events_connection(
    state: Arc<FeedState>,
    user_filter: Option<String>,
    socket: WebSocket,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut event_rx = state.hub.subscribe();

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let event = match event {
                    Ok(e) => e,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                if let Some(ref user) = user_filter {
                    if event.user() != user {
                        continue;
                    }
                }
                if let Ok(json) = serde_json::to_string(&event) {
                    if ws_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
            }
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }
}
