// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bearer-token guard for the API surface.
//!
//! One middleware covers every HTTP route. The events WebSocket cannot carry
//! headers through the browser upgrade, so it presents its token as a query
//! parameter and is exempted here; [`ws_token_ok`] is its check.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::FeedError;
use crate::state::FeedState;

/// Paths served without a bearer header: health for liveness probes, and
/// WebSocket upgrades, which authenticate in their own handler.
fn is_open(path: &str) -> bool {
    path == "/api/v1/health" || path.starts_with("/ws/")
}

/// Fixed-time token comparison. Folds the length difference into the
/// accumulator so equal-length prefixes are not distinguishable by timing.
fn token_matches(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    let mut diff = a.len() ^ b.len();
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= usize::from(x ^ y);
    }
    diff == 0
}

/// Check a token presented out-of-band (the events WebSocket query string).
pub fn ws_token_ok(presented: Option<&str>, expected: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(expected) => presented.is_some_and(|token| token_matches(token, expected)),
    }
}

/// Middleware enforcing `Authorization: Bearer <token>` on the API routes.
/// A service with no configured token runs open.
pub async fn auth_layer(
    State(state): State<Arc<FeedState>>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(expected) = state.config.auth_token.as_deref() else {
        return next.run(req).await;
    };
    if is_open(req.uri().path()) {
        return next.run(req).await;
    }

    let presented = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    match presented {
        Some(token) if token_matches(token, expected) => next.run(req).await,
        _ => FeedError::Unauthorized
            .to_http_response("missing or invalid bearer token")
            .into_response(),
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
