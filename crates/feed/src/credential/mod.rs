// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-user access-token caching and bounded refresh.

pub mod manager;

/// A cached access token with its absolute expiry.
///
/// Entries are superseded whole on refresh, never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    /// Epoch millis.
    pub expires_at: u64,
}

impl CachedToken {
    /// Whether the token is still safely usable at `now_ms` given the
    /// configured margin.
    pub fn is_fresh(&self, now_ms: u64, margin_ms: u64) -> bool {
        now_ms.saturating_add(margin_ms) < self.expires_at
    }
}
