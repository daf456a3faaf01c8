// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile store seam.
//!
//! The engine treats per-user persistence as an external collaborator: a
//! key-value record of activity state, OAuth credentials, and the last
//! normalized track. [`MemoryStore`] is the in-process implementation used by
//! the binary and the tests; a durable backend plugs in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Per-user profile record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub is_active: bool,
    /// Epoch millis of the last confirmed activity, if any.
    #[serde(default)]
    pub last_activity: Option<u64>,
    /// Application session expiry (epoch millis), independent of token expiry.
    #[serde(default)]
    pub session_expires_at: Option<u64>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
}

impl Profile {
    /// Whether the stored OAuth material is sufficient to refresh a token.
    pub fn has_credentials(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// Partial update applied to a profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub is_active: Option<bool>,
    pub last_activity: Option<u64>,
    pub session_expires_at: Option<u64>,
    pub access_token: Option<String>,
}

/// Normalized "currently playing" record persisted per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub title: String,
    /// All artists joined with ", ".
    pub artist: String,
    pub album: String,
    pub artwork_url: String,
    pub duration_ms: u64,
    pub progress_ms: u64,
    /// Integer playback progress percentage, 0 when duration is unknown.
    pub percent: u32,
    pub is_playing: bool,
    pub updated_at: u64,
}

impl TrackRecord {
    /// The explicit "not playing" record: all fields blank or zero.
    pub fn not_playing(updated_at: u64) -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            artwork_url: String::new(),
            duration_ms: 0,
            progress_ms: 0,
            percent: 0,
            is_playing: false,
            updated_at,
        }
    }
}

/// External per-user persistence contract.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<Profile>;
    async fn update(&self, user_id: &str, patch: ProfilePatch);
    async fn upsert_track(&self, user_id: &str, track: TrackRecord);
    async fn get_track(&self, user_id: &str) -> Option<TrackRecord>;
    /// User ids whose profile has `is_active = true`.
    async fn active_user_ids(&self) -> Vec<String>;
}

/// In-memory profile store.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, Profile>>,
    tracks: RwLock<HashMap<String, TrackRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load seed profiles from a JSON file mapping user id to profile.
    pub fn from_seed_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let profiles: HashMap<String, Profile> = serde_json::from_str(&contents)?;
        Ok(Self { profiles: RwLock::new(profiles), tracks: RwLock::new(HashMap::new()) })
    }

    /// Insert a full profile (seed/test helper).
    pub async fn put_profile(&self, user_id: &str, profile: Profile) {
        self.profiles.write().await.insert(user_id.to_owned(), profile);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Option<Profile> {
        self.profiles.read().await.get(user_id).cloned()
    }

    async fn update(&self, user_id: &str, patch: ProfilePatch) {
        let mut profiles = self.profiles.write().await;
        let profile = profiles.entry(user_id.to_owned()).or_default();
        if let Some(active) = patch.is_active {
            profile.is_active = active;
        }
        if let Some(ts) = patch.last_activity {
            profile.last_activity = Some(ts);
        }
        if let Some(ts) = patch.session_expires_at {
            profile.session_expires_at = Some(ts);
        }
        if let Some(token) = patch.access_token {
            profile.access_token = Some(token);
        }
    }

    async fn upsert_track(&self, user_id: &str, track: TrackRecord) {
        self.tracks.write().await.insert(user_id.to_owned(), track);
    }

    async fn get_track(&self, user_id: &str) -> Option<TrackRecord> {
        self.tracks.read().await.get(user_id).cloned()
    }

    async fn active_user_ids(&self) -> Vec<String> {
        self.profiles
            .read()
            .await
            .iter()
            .filter(|(_, p)| p.is_active)
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
