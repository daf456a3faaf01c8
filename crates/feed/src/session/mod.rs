// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry, per-user poll loop, and API-hit accounting.

pub mod hits;
pub mod poller;
pub mod registry;

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64};
use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::state::epoch_ms;

/// A live polling session for one user.
///
/// Invariant: at most one entry per user id lives in the registry; replacing
/// an entry cancels the old one first so no ghost task survives.
pub struct SessionEntry {
    pub user_id: String,
    /// Opaque token minted per (re)start; stale activity pings are rejected
    /// by comparing against it.
    pub session_id: String,
    /// True when the last successful fetch reported "not playing". Affects
    /// cadence only, never liveness.
    pub is_paused: AtomicBool,
    /// Epoch millis of the last successful tick or accepted activity ping.
    pub last_activity_ms: AtomicU64,
    pub api_hits: AtomicU32,
    /// Epoch millis when the current hit window opened.
    pub hit_window_start_ms: AtomicU64,
    pub started_at: Instant,
    pub cancel: CancellationToken,
}

impl SessionEntry {
    pub fn new(user_id: &str, session_id: String) -> Self {
        let now = epoch_ms();
        Self {
            user_id: user_id.to_owned(),
            session_id,
            is_paused: AtomicBool::new(false),
            last_activity_ms: AtomicU64::new(now),
            api_hits: AtomicU32::new(0),
            hit_window_start_ms: AtomicU64::new(now),
            started_at: Instant::now(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Result of starting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub session_id: String,
    pub is_polling: bool,
}

/// Operator-visible hit telemetry for one user.
#[derive(Debug, Clone, Serialize)]
pub struct ApiStats {
    pub hits: u32,
    pub last_reset_ms: u64,
    pub since_reset_ms: u64,
}
