// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reqwest implementation of the upstream API.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::upstream::{ClientCredentials, CurrentlyPlaying, NowPlayingApi, TokenGrant};

/// HTTP client for the real "currently playing" and OAuth token endpoints.
pub struct SpotifyClient {
    now_playing_url: String,
    token_url: String,
    client: Client,
}

impl SpotifyClient {
    pub fn new(config: &FeedConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            now_playing_url: config.now_playing_url.clone(),
            token_url: config.token_url.clone(),
            client,
        }
    }
}

#[async_trait]
impl NowPlayingApi for SpotifyClient {
    async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, FeedError> {
        let resp = self
            .client
            .get(&self.now_playing_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(FeedError::upstream)?;

        let status = resp.status();
        if status.as_u16() == 204 {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::debug!(url = %self.now_playing_url, status = status.as_u16(), "now-playing fetch failed");
            return Err(FeedError::upstream_status(status.as_u16(), text));
        }

        let bytes = resp.bytes().await.map_err(FeedError::upstream)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let playing: CurrentlyPlaying =
            serde_json::from_slice(&bytes).map_err(FeedError::upstream)?;
        Ok(Some(playing))
    }

    async fn refresh_access_token(
        &self,
        credentials: &ClientCredentials,
    ) -> Result<TokenGrant, FeedError> {
        let resp = self
            .client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", credentials.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(FeedError::upstream)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            tracing::debug!(url = %self.token_url, status = status.as_u16(), "token refresh rejected");
            return Err(FeedError::upstream_status(status.as_u16(), text));
        }

        let grant: TokenGrant = resp.json().await.map_err(FeedError::upstream)?;
        Ok(grant)
    }
}
