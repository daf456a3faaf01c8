// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Web-player bearer token fetch for the native canvas path.

use serde::Deserialize;

use crate::error::FeedError;

#[derive(Debug, Deserialize)]
struct WebTokenResponse {
    #[serde(rename = "accessToken")]
    access_token: String,
}

/// Truncate a secret for log output. Never log the full value.
pub fn redact(secret: &str) -> String {
    let prefix: String = secret.chars().take(6).collect();
    format!("{prefix}…")
}

/// Fetch a web-player access token, optionally authenticated with a session
/// cookie for user-scoped canvases.
pub async fn fetch_web_token(
    client: &reqwest::Client,
    token_url: &str,
    cookie: Option<&str>,
) -> Result<String, FeedError> {
    let mut req = client.get(token_url);
    if let Some(cookie) = cookie {
        req = req.header("Cookie", format!("sp_dc={cookie}"));
    }

    let resp = req.send().await.map_err(FeedError::upstream)?;
    let status = resp.status();
    if !status.is_success() {
        let redacted_cookie = cookie.map(redact).unwrap_or_default();
        tracing::debug!(
            url = %token_url,
            status = status.as_u16(),
            cookie = %redacted_cookie,
            "web token fetch failed"
        );
        return Err(FeedError::upstream_status(status.as_u16(), "web token fetch failed"));
    }

    let token: WebTokenResponse = resp.json().await.map_err(FeedError::upstream)?;
    if token.access_token.is_empty() {
        return Err(FeedError::upstream("web token response missing accessToken"));
    }
    Ok(token.access_token)
}
