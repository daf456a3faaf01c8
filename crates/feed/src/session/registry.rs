// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session registry operations: start, stop, activity pings, stats, resume.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::error::FeedError;
use crate::events::{EventSink, FeedEvent};
use crate::session::poller::spawn_poller;
use crate::session::{ApiStats, SessionEntry, StartOutcome};
use crate::state::{epoch_ms, FeedState};
use crate::store::{ProfilePatch, ProfileStore};

/// Summary of a live session for the list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub user_id: String,
    pub session_id: String,
    pub is_paused: bool,
    pub last_activity_ms: u64,
    pub uptime_ms: u64,
}

impl FeedState {
    /// Start (or restart) a polling session for a user.
    ///
    /// Marks the profile active with a fresh application-session expiry,
    /// mints a new session id, and tears down any prior entry before
    /// inserting the new one.
    pub async fn start_session(self: &Arc<Self>, user_id: &str) -> Result<StartOutcome, FeedError> {
        let profile = self.store.get(user_id).await.ok_or(FeedError::CredentialsMissing)?;
        if !profile.has_credentials() {
            return Err(FeedError::CredentialsMissing);
        }

        let now = epoch_ms();
        self.store
            .update(
                user_id,
                ProfilePatch {
                    is_active: Some(true),
                    last_activity: Some(now),
                    session_expires_at: Some(now + self.config.session_ttl().as_millis() as u64),
                    ..Default::default()
                },
            )
            .await;

        let session_id = uuid::Uuid::new_v4().to_string();
        let entry = Arc::new(SessionEntry::new(user_id, session_id.clone()));

        {
            let mut sessions = self.sessions.write().await;
            if let Some(old) = sessions.insert(user_id.to_owned(), Arc::clone(&entry)) {
                old.cancel.cancel();
                tracing::debug!(user_id, old_session = %old.session_id, "replaced prior session");
            }
        }

        spawn_poller(Arc::clone(self), Arc::clone(&entry));
        self.sink
            .emit_to_user(
                user_id,
                FeedEvent::SessionStarted { user: user_id.to_owned(), session: session_id.clone() },
            )
            .await;
        tracing::info!(user_id, session_id = %session_id, "session started");

        Ok(StartOutcome { session_id, is_polling: true })
    }

    /// Stop a session. Idempotent: stopping an unknown user is a no-op.
    pub async fn stop_session(&self, user_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(user_id);
        match removed {
            Some(entry) => {
                entry.cancel.cancel();
                self.sink
                    .emit_to_user(user_id, FeedEvent::SessionStopped { user: user_id.to_owned() })
                    .await;
                tracing::info!(user_id, session_id = %entry.session_id, "session stopped");
                true
            }
            None => false,
        }
    }

    /// Cancel every live session (process shutdown).
    pub async fn stop_all(&self) {
        let mut sessions = self.sessions.write().await;
        for entry in sessions.values() {
            entry.cancel.cancel();
        }
        sessions.clear();
    }

    /// Record an externally-reported activity ping.
    ///
    /// Accepted only when `session_id` matches the live session; stale pings
    /// (including those from before a stop/start cycle) return false.
    pub async fn update_activity(&self, user_id: &str, session_id: &str) -> bool {
        let entry = {
            let sessions = self.sessions.read().await;
            match sessions.get(user_id) {
                Some(e) => Arc::clone(e),
                None => return false,
            }
        };
        if entry.session_id != session_id {
            return false;
        }

        let now = epoch_ms();
        entry.last_activity_ms.store(now, Ordering::Relaxed);
        self.store
            .update(user_id, ProfilePatch { last_activity: Some(now), ..Default::default() })
            .await;
        true
    }

    /// Hit telemetry for one user's live session.
    pub async fn get_api_stats(&self, user_id: &str) -> Option<ApiStats> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(user_id)?;
        let window_start = entry.hit_window_start_ms.load(Ordering::Relaxed);
        Some(ApiStats {
            hits: entry.api_hits.load(Ordering::Relaxed),
            last_reset_ms: window_start,
            since_reset_ms: epoch_ms().saturating_sub(window_start),
        })
    }

    /// List live sessions.
    pub async fn list_sessions(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        let mut list = Vec::with_capacity(sessions.len());
        for entry in sessions.values() {
            list.push(SessionInfo {
                user_id: entry.user_id.clone(),
                session_id: entry.session_id.clone(),
                is_paused: entry.is_paused.load(Ordering::Relaxed),
                last_activity_ms: entry.last_activity_ms.load(Ordering::Relaxed),
                uptime_ms: entry.started_at.elapsed().as_millis() as u64,
            });
        }
        list
    }

    /// Rehydrate sessions after a restart.
    ///
    /// Poll state is never persisted; sessions are reconstructed from the
    /// profile store for users that still pass the activity gate. Returns how
    /// many sessions were resumed.
    pub async fn resume_active_sessions(self: &Arc<Self>) -> usize {
        let candidates = self.store.active_user_ids().await;
        let mut resumed = 0;
        for user_id in candidates {
            if !self.gate.is_active(&user_id).await {
                continue;
            }
            match self.start_session(&user_id).await {
                Ok(outcome) => {
                    resumed += 1;
                    tracing::info!(user_id = %user_id, session_id = %outcome.session_id, "session resumed");
                }
                Err(e) => {
                    tracing::warn!(user_id = %user_id, err = %e, "failed to resume session");
                }
            }
        }
        resumed
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
