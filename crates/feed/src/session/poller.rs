// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The adaptive poll loop: one cooperative task per live session.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::FeedError;
use crate::events::{EventSink, FeedEvent};
use crate::session::hits::record_hit;
use crate::session::SessionEntry;
use crate::state::{epoch_ms, FeedState};
use crate::store::ProfileStore;
use crate::upstream::track::normalize;
use crate::upstream::NowPlayingApi;

/// What a completed tick tells the loop to do next.
enum TickOutcome {
    /// Keep polling; cadence depends on playback state.
    Continue { is_playing: bool },
    /// Activity gate failed — normal termination, leave no trace.
    Stop,
}

/// Compute the delay before the next tick.
///
/// Processing time is subtracted so effective wall-clock cadence stays stable
/// regardless of upstream latency.
pub fn next_delay(cadence: Duration, elapsed: Duration) -> Duration {
    cadence.saturating_sub(elapsed)
}

/// Spawn the poll task for a session entry.
pub fn spawn_poller(state: Arc<FeedState>, entry: Arc<SessionEntry>) {
    tokio::spawn(async move {
        loop {
            if entry.cancel.is_cancelled() {
                break;
            }

            let tick_start = Instant::now();
            let delay = match run_tick(&state, &entry).await {
                Ok(TickOutcome::Stop) | Err(FeedError::UserInactive) => {
                    retire(&state, &entry).await;
                    break;
                }
                Ok(TickOutcome::Continue { is_playing }) => {
                    let cadence = if is_playing {
                        state.config.playing_poll_interval()
                    } else {
                        state.config.paused_poll_interval()
                    };
                    next_delay(cadence, tick_start.elapsed())
                }
                Err(e) => {
                    // A single failed tick must not kill the session.
                    tracing::warn!(user_id = %entry.user_id, err = %e, "tick failed, will retry");
                    state.config.error_retry_interval()
                }
            };

            tokio::select! {
                _ = entry.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }

            // Ghost-timer guard: a stop may have raced the sleep. Only the
            // entry still registered under this exact session id may continue.
            if entry.cancel.is_cancelled() || !is_live(&state, &entry).await {
                break;
            }
        }
        tracing::debug!(user_id = %entry.user_id, session_id = %entry.session_id, "poll loop exited");
    });
}

/// One poll-and-persist tick.
async fn run_tick(state: &FeedState, entry: &SessionEntry) -> Result<TickOutcome, FeedError> {
    if !state.gate.is_active(&entry.user_id).await {
        return Ok(TickOutcome::Stop);
    }

    let sample = record_hit(entry, epoch_ms());
    state
        .sink
        .emit_to_user(
            &entry.user_id,
            FeedEvent::ApiHits {
                user: entry.user_id.clone(),
                hits: sample.hits,
                timestamp: sample.now_ms,
                since_reset_ms: sample.since_reset_ms,
            },
        )
        .await;

    let token = state.tokens.get_access_token(&entry.user_id).await?;

    let playing = match state.api.currently_playing(&token).await {
        Ok(p) => p,
        Err(e) if e.is_auth() => {
            // Token went bad mid-lifetime; drop it so the next tick refreshes.
            state.tokens.invalidate(&entry.user_id).await;
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let record = normalize(playing, epoch_ms());
    let is_playing = record.is_playing;
    state.store.upsert_track(&entry.user_id, record).await;

    entry.is_paused.store(!is_playing, Ordering::Relaxed);
    entry.last_activity_ms.store(epoch_ms(), Ordering::Relaxed);

    Ok(TickOutcome::Continue { is_playing })
}

/// Whether this exact entry (same session id) is still registered.
async fn is_live(state: &FeedState, entry: &SessionEntry) -> bool {
    let sessions = state.sessions.read().await;
    sessions.get(&entry.user_id).is_some_and(|live| live.session_id == entry.session_id)
}

/// Remove a gate-terminated session from the registry, but only if the
/// registry still points at this entry (a restart may have replaced it).
async fn retire(state: &FeedState, entry: &SessionEntry) {
    let removed = {
        let mut sessions = state.sessions.write().await;
        match sessions.get(&entry.user_id) {
            Some(live) if live.session_id == entry.session_id => {
                sessions.remove(&entry.user_id);
                true
            }
            _ => false,
        }
    };
    if removed {
        state
            .sink
            .emit_to_user(
                &entry.user_id,
                FeedEvent::SessionStopped { user: entry.user_id.clone() },
            )
            .await;
        tracing::info!(user_id = %entry.user_id, "session ended (user inactive)");
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
