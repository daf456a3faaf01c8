// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scraper path: parse a public mirror's HTML for the canvas video URL.

use std::sync::OnceLock;

use regex::Regex;

/// Interstitial markers that mean the mirror served a bot challenge instead
/// of content. Parsing must stop immediately on any of these.
const CHALLENGE_MARKERS: &[&str] = &[
    "Just a moment",
    "cf-chl",
    "challenge-platform",
    "Verifying you are human",
    "cf_chl_opt",
];

/// What the scrape body contained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// A canvas video URL.
    Found(String),
    /// The mirror answered with a verification interstitial.
    BotChallenge,
    /// Parseable page, but no video element.
    NotFound,
}

fn source_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?s)<video[^>]*>.*?<source[^>]*src="([^"]+)""#).ok())
        .as_ref()
}

/// Parse a mirror response body.
pub fn parse_scrape_body(body: &str) -> ScrapeOutcome {
    if CHALLENGE_MARKERS.iter().any(|marker| body.contains(marker)) {
        return ScrapeOutcome::BotChallenge;
    }

    let Some(re) = source_regex() else {
        return ScrapeOutcome::NotFound;
    };
    match re.captures(body).and_then(|c| c.get(1)) {
        Some(m) if !m.as_str().is_empty() => ScrapeOutcome::Found(m.as_str().to_owned()),
        _ => ScrapeOutcome::NotFound,
    }
}

/// Fetch the mirror page for a track and parse it.
pub async fn fetch_scrape(
    client: &reqwest::Client,
    mirror_url: &str,
    track_id: &str,
) -> Result<ScrapeOutcome, crate::error::FeedError> {
    let url = format!("{mirror_url}{track_id}");
    let resp = client.get(&url).send().await.map_err(crate::error::FeedError::upstream)?;

    let status = resp.status();
    if !status.is_success() {
        tracing::debug!(url = %url, status = status.as_u16(), "canvas mirror fetch failed");
        return Err(crate::error::FeedError::upstream_status(
            status.as_u16(),
            "canvas mirror error",
        ));
    }

    let body = resp.text().await.map_err(crate::error::FeedError::upstream)?;
    Ok(parse_scrape_body(&body))
}

#[cfg(test)]
#[path = "scrape_tests.rs"]
mod tests;
