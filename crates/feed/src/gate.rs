// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity gate: the single decision function for "is this user still live".
//!
//! Callers must not re-derive activity from the raw profile fields; every
//! consumer (poller, token manager, route layer) goes through
//! [`ActivityGate::is_active`].

use std::sync::Arc;
use std::time::Duration;

use crate::state::epoch_ms;
use crate::store::{ProfilePatch, ProfileStore};

/// Decides whether a user's session is still considered live.
#[derive(Clone)]
pub struct ActivityGate {
    store: Arc<dyn ProfileStore>,
    window: Duration,
}

impl ActivityGate {
    pub fn new(store: Arc<dyn ProfileStore>, window: Duration) -> Self {
        Self { store, window }
    }

    /// True when the user counts as active.
    ///
    /// A missing profile is inactive (never poll on behalf of an unknown
    /// user). An active flag with no `last_activity` timestamp is treated as
    /// active and the timestamp is backfilled.
    pub async fn is_active(&self, user_id: &str) -> bool {
        let Some(profile) = self.store.get(user_id).await else {
            return false;
        };

        if !profile.is_active {
            return false;
        }

        let now = epoch_ms();
        match profile.last_activity {
            None => {
                // Self-heal stale records that carry the flag but no timestamp.
                self.store
                    .update(
                        user_id,
                        ProfilePatch { last_activity: Some(now), ..Default::default() },
                    )
                    .await;
                true
            }
            Some(ts) if now.saturating_sub(ts) <= self.window.as_millis() as u64 => true,
            Some(_) => profile.session_expires_at.is_some_and(|exp| exp > now),
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
