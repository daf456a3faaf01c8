// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canvas resolution: scraper path first, native binary protocol second.
//!
//! This backs a best-effort UI feature, so the resolver never returns an
//! error — every failure path degrades to a null link plus a reason string.

pub mod scrape;
pub mod token;
pub mod wire;

use reqwest::Client;
use serde::Serialize;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::canvas::scrape::{fetch_scrape, ScrapeOutcome};
use crate::canvas::token::{fetch_web_token, redact};

/// Outcome of a canvas lookup. `error` explains a null link.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasResult {
    pub video_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CanvasResult {
    fn found(url: String) -> Self {
        Self { video_link: Some(url), error: None }
    }

    fn missing(reason: impl Into<String>) -> Self {
        Self { video_link: None, error: Some(reason.into()) }
    }
}

/// Resolves a track id to a looping background-video URL.
pub struct CanvasResolver {
    mirror_url: String,
    web_token_url: String,
    canvas_url: String,
    client: Client,
}

impl CanvasResolver {
    pub fn new(config: &FeedConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            mirror_url: config.canvas_mirror_url.clone(),
            web_token_url: config.web_token_url.clone(),
            canvas_url: config.canvas_url.clone(),
            client,
        }
    }

    /// Resolve a canvas for a track. Never fails; both paths are best-effort.
    pub async fn resolve(&self, track_id: &str, cookie: Option<&str>) -> CanvasResult {
        match fetch_scrape(&self.client, &self.mirror_url, track_id).await {
            Ok(ScrapeOutcome::Found(url)) => return CanvasResult::found(url),
            Ok(ScrapeOutcome::BotChallenge) => {
                tracing::info!(track_id, "canvas mirror served a bot challenge, using native path");
            }
            Ok(ScrapeOutcome::NotFound) => {
                tracing::debug!(track_id, "canvas mirror had no video, using native path");
            }
            Err(e) => {
                tracing::debug!(track_id, err = %e, "canvas mirror fetch failed, using native path");
            }
        }

        match self.resolve_native(track_id, cookie).await {
            Ok(Some(url)) => CanvasResult::found(url),
            Ok(None) => CanvasResult::missing("no canvas available for track"),
            Err(e) => {
                tracing::debug!(track_id, err = %e, "native canvas path failed");
                CanvasResult::missing(e.to_string())
            }
        }
    }

    /// Native protocol path: web token, then a binary request/response.
    async fn resolve_native(
        &self,
        track_id: &str,
        cookie: Option<&str>,
    ) -> Result<Option<String>, FeedError> {
        let bearer = fetch_web_token(&self.client, &self.web_token_url, cookie).await?;

        let track_uri = format!("spotify:track:{track_id}");
        let body = wire::encode_request(&track_uri);

        let resp = self
            .client
            .post(&self.canvas_url)
            .bearer_auth(&bearer)
            .header("Content-Type", "application/x-protobuf")
            .header("Accept", "application/x-protobuf")
            .body(body)
            .send()
            .await
            .map_err(FeedError::upstream)?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(
                url = %self.canvas_url,
                status = status.as_u16(),
                bearer = %redact(&bearer),
                "native canvas request failed"
            );
            return Err(FeedError::upstream_status(status.as_u16(), "native canvas error"));
        }

        let bytes = resp.bytes().await.map_err(FeedError::upstream)?;
        let decoded = wire::decode_response(&bytes)?;
        Ok(wire::first_canvas_url(&decoded))
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
