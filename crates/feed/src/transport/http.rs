// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the feed engine.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::state::FeedState;
use crate::store::ProfileStore;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub session_count: usize,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
    pub is_polling: bool,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub user_id: String,
    pub stopped: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct CanvasQuery {
    /// Optional web-player session cookie for user-scoped canvases.
    #[serde(default)]
    pub cookie: Option<String>,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<FeedState>>) -> impl IntoResponse {
    Json(HealthResponse { status: "running".to_owned(), session_count: s.session_count().await })
}

/// `POST /api/v1/sessions/{user_id}` — start (or restart) a polling session.
pub async fn start_session(
    State(s): State<Arc<FeedState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match s.start_session(&user_id).await {
        Ok(outcome) => Json(StartResponse {
            success: true,
            message: "session started".to_owned(),
            session_id: outcome.session_id,
            is_polling: outcome.is_polling,
        })
        .into_response(),
        Err(e @ FeedError::CredentialsMissing) => {
            e.to_http_response("no linked playback credentials for user").into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, err = %e, "session start failed");
            e.to_http_response("failed to start session").into_response()
        }
    }
}

/// `DELETE /api/v1/sessions/{user_id}` — stop a session (idempotent).
pub async fn stop_session(
    State(s): State<Arc<FeedState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let stopped = s.stop_session(&user_id).await;
    Json(StopResponse { user_id, stopped })
}

/// `GET /api/v1/sessions` — list live sessions.
pub async fn list_sessions(State(s): State<Arc<FeedState>>) -> impl IntoResponse {
    Json(s.list_sessions().await)
}

/// `POST /api/v1/sessions/{user_id}/activity` — activity ping.
///
/// Accepted only when the supplied session id matches the live session.
pub async fn update_activity(
    State(s): State<Arc<FeedState>>,
    Path(user_id): Path<String>,
    Json(req): Json<ActivityRequest>,
) -> impl IntoResponse {
    let accepted = s.update_activity(&user_id, &req.session_id).await;
    Json(ActivityResponse { accepted })
}

/// `GET /api/v1/sessions/{user_id}/stats` — per-user API-hit telemetry.
pub async fn session_stats(
    State(s): State<Arc<FeedState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match s.get_api_stats(&user_id).await {
        Some(stats) => Json(stats).into_response(),
        None => FeedError::SessionNotFound.to_http_response("no live session").into_response(),
    }
}

/// `GET /api/v1/sessions/{user_id}/track` — last stored track record.
pub async fn session_track(
    State(s): State<Arc<FeedState>>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    match s.store.get_track(&user_id).await {
        Some(track) => Json(track).into_response(),
        None => FeedError::SessionNotFound
            .to_http_response("no track recorded for user")
            .into_response(),
    }
}

/// `GET /api/v1/canvas/{track_id}` — best-effort canvas lookup. Always 200.
pub async fn canvas(
    State(s): State<Arc<FeedState>>,
    Path(track_id): Path<String>,
    Query(query): Query<CanvasQuery>,
) -> impl IntoResponse {
    Json(s.canvas.resolve(&track_id, query.cookie.as_deref()).await)
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
