// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP + WebSocket transport for the feed engine.

pub mod auth;
pub mod http;
pub mod ws;

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::FeedState;

/// Build the axum `Router` with all engine routes.
pub fn build_router(state: Arc<FeedState>) -> Router {
    Router::new()
        // Health (no auth)
        .route("/api/v1/health", get(http::health))
        // Session lifecycle
        .route("/api/v1/sessions", get(http::list_sessions))
        .route(
            "/api/v1/sessions/{user_id}",
            post(http::start_session).delete(http::stop_session),
        )
        .route("/api/v1/sessions/{user_id}/activity", post(http::update_activity))
        .route("/api/v1/sessions/{user_id}/stats", get(http::session_stats))
        .route("/api/v1/sessions/{user_id}/track", get(http::session_track))
        // Canvas
        .route("/api/v1/canvas/{track_id}", get(http::canvas))
        // Event fan-out
        .route("/ws/events", get(ws::ws_events_handler))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
