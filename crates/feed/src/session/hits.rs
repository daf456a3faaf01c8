// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API-hit accounting: per-user rolling counters with a periodic reset sweep.
//!
//! Pure observability. Throttling lives in the poll cadence, never here.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::events::{EventSink, FeedEvent};
use crate::session::SessionEntry;
use crate::state::{epoch_ms, FeedState};

/// Snapshot taken when a hit is recorded.
#[derive(Debug, Clone, Copy)]
pub struct HitSample {
    pub hits: u32,
    pub now_ms: u64,
    pub since_reset_ms: u64,
}

/// Increment the per-user counter and return the updated sample.
pub fn record_hit(entry: &SessionEntry, now_ms: u64) -> HitSample {
    let hits = entry.api_hits.fetch_add(1, Ordering::Relaxed) + 1;
    let window_start = entry.hit_window_start_ms.load(Ordering::Relaxed);
    HitSample { hits, now_ms, since_reset_ms: now_ms.saturating_sub(window_start) }
}

/// Reset the counter if its window has exceeded `window_ms`. Returns true
/// when a reset happened.
pub fn maybe_reset(entry: &SessionEntry, now_ms: u64, window_ms: u64) -> bool {
    let window_start = entry.hit_window_start_ms.load(Ordering::Relaxed);
    if now_ms.saturating_sub(window_start) < window_ms {
        return false;
    }
    entry.api_hits.store(0, Ordering::Relaxed);
    entry.hit_window_start_ms.store(now_ms, Ordering::Relaxed);
    true
}

/// Spawn the background sweep that rolls hit windows over and emits reset
/// events.
pub fn spawn_hit_sweeper(state: Arc<FeedState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.hit_sweep_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let window_ms = state.config.hit_window().as_millis() as u64;

        loop {
            tokio::select! {
                _ = state.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let entries: Vec<Arc<SessionEntry>> =
                state.sessions.read().await.values().map(Arc::clone).collect();
            let now = epoch_ms();
            for entry in entries {
                if maybe_reset(&entry, now, window_ms) {
                    state
                        .sink
                        .emit_to_user(
                            &entry.user_id,
                            FeedEvent::HitsReset { user: entry.user_id.clone(), timestamp: now },
                        )
                        .await;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "hits_tests.rs"]
mod tests;
