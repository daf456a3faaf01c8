// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upstream "currently playing" and OAuth token endpoints.

pub mod client;
pub mod track;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

/// OAuth client material needed for a refresh grant.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

/// Successful refresh grant response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

/// Raw "currently playing" payload, as much of it as the engine needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub is_playing: bool,
    #[serde(default)]
    pub progress_ms: Option<u64>,
    #[serde(default)]
    pub currently_playing_type: Option<String>,
    #[serde(default)]
    pub item: Option<TrackItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub album: Option<AlbumRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: String,
}

/// The two upstream calls a poll tick can make.
#[async_trait]
pub trait NowPlayingApi: Send + Sync {
    /// Fetch the user's current playback. `None` means nothing is playing
    /// (upstream answered 204 or an empty body).
    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, FeedError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_access_token(
        &self,
        credentials: &ClientCredentials,
    ) -> Result<TokenGrant, FeedError>;
}
