// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token manager: gate-first token lookup with write-through cache and a
//! bounded, immediate retry budget for refresh failures.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::credential::CachedToken;
use crate::error::FeedError;
use crate::gate::ActivityGate;
use crate::state::epoch_ms;
use crate::store::{ProfilePatch, ProfileStore};
use crate::upstream::{ClientCredentials, NowPlayingApi};

/// Manages token freshness for all users.
pub struct TokenManager {
    store: Arc<dyn ProfileStore>,
    api: Arc<dyn NowPlayingApi>,
    gate: ActivityGate,
    cache: RwLock<HashMap<String, CachedToken>>,
    margin: Duration,
    max_attempts: u32,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn ProfileStore>,
        api: Arc<dyn NowPlayingApi>,
        gate: ActivityGate,
        margin: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            store,
            api,
            gate,
            cache: RwLock::new(HashMap::new()),
            margin,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Return a usable access token for the user.
    ///
    /// Order matters: the activity gate runs before anything else so refresh
    /// quota is never spent on an inactive user, and the cache is consulted
    /// before any network call.
    pub async fn get_access_token(&self, user_id: &str) -> Result<String, FeedError> {
        if !self.gate.is_active(user_id).await {
            return Err(FeedError::UserInactive);
        }

        let now = epoch_ms();
        let margin_ms = self.margin.as_millis() as u64;
        {
            let cache = self.cache.read().await;
            if let Some(token) = cache.get(user_id) {
                if token.is_fresh(now, margin_ms) {
                    return Ok(token.access_token.clone());
                }
            }
        }

        let credentials = self.load_credentials(user_id).await?;

        let mut last_err = FeedError::RefreshExhausted;
        for attempt in 0..self.max_attempts {
            match self.api.refresh_access_token(&credentials).await {
                Ok(grant) => {
                    let expires_at = epoch_ms() + grant.expires_in.saturating_mul(1000);
                    self.store
                        .update(
                            user_id,
                            ProfilePatch {
                                access_token: Some(grant.access_token.clone()),
                                ..Default::default()
                            },
                        )
                        .await;
                    let entry =
                        CachedToken { access_token: grant.access_token.clone(), expires_at };
                    self.cache.write().await.insert(user_id.to_owned(), entry);
                    return Ok(grant.access_token);
                }
                Err(e) => {
                    tracing::debug!(user_id, attempt, err = %e, "token refresh attempt failed");
                    last_err = e;
                }
            }
        }

        tracing::warn!(user_id, attempts = self.max_attempts, err = %last_err, "token refresh exhausted");
        Err(FeedError::RefreshExhausted)
    }

    /// Drop the cached token for a user, forcing a refresh on next request.
    pub async fn invalidate(&self, user_id: &str) {
        self.cache.write().await.remove(user_id);
    }

    /// Current cache entry, if any.
    pub async fn cached(&self, user_id: &str) -> Option<CachedToken> {
        self.cache.read().await.get(user_id).cloned()
    }

    async fn load_credentials(&self, user_id: &str) -> Result<ClientCredentials, FeedError> {
        let profile = self.store.get(user_id).await.ok_or(FeedError::CredentialsMissing)?;
        match (profile.client_id, profile.client_secret, profile.refresh_token) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Ok(ClientCredentials { client_id, client_secret, refresh_token })
            }
            _ => Err(FeedError::CredentialsMissing),
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
