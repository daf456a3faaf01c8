// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Configuration for the nowfeed engine.
#[derive(Debug, Clone, clap::Parser)]
pub struct FeedConfig {
    /// Host to bind on.
    #[arg(long, default_value = "127.0.0.1", env = "NOWFEED_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 9620, env = "NOWFEED_PORT")]
    pub port: u16,

    /// Bearer token for downstream API auth. If unset, auth is disabled.
    #[arg(long, env = "NOWFEED_AUTH_TOKEN")]
    pub auth_token: Option<String>,

    /// Poll cadence while the user is playing, in milliseconds.
    #[arg(long, default_value_t = 1000, env = "NOWFEED_PLAYING_POLL_MS")]
    pub playing_poll_ms: u64,

    /// Poll cadence while playback is paused/stopped, in milliseconds.
    #[arg(long, default_value_t = 5000, env = "NOWFEED_PAUSED_POLL_MS")]
    pub paused_poll_ms: u64,

    /// Delay before retrying after a failed tick, in milliseconds.
    #[arg(long, default_value_t = 1000, env = "NOWFEED_ERROR_RETRY_MS")]
    pub error_retry_ms: u64,

    /// How recent `last_activity` must be for a user to count as active, in seconds.
    #[arg(long, default_value_t = 300, env = "NOWFEED_ACTIVITY_WINDOW_SECS")]
    pub activity_window_secs: u64,

    /// Safety margin before token expiry that forces a refresh, in seconds.
    #[arg(long, default_value_t = 300, env = "NOWFEED_TOKEN_MARGIN_SECS")]
    pub token_margin_secs: u64,

    /// Application session lifetime granted on session start, in seconds.
    #[arg(long, default_value_t = 3600, env = "NOWFEED_SESSION_TTL_SECS")]
    pub session_ttl_secs: u64,

    /// Max token refresh attempts before giving up.
    #[arg(long, default_value_t = 3, env = "NOWFEED_REFRESH_ATTEMPTS")]
    pub refresh_attempts: u32,

    /// API-hit counter window, in seconds.
    #[arg(long, default_value_t = 60, env = "NOWFEED_HIT_WINDOW_SECS")]
    pub hit_window_secs: u64,

    /// API-hit sweeper interval, in milliseconds.
    #[arg(long, default_value_t = 10000, env = "NOWFEED_HIT_SWEEP_MS")]
    pub hit_sweep_ms: u64,

    /// OAuth token endpoint for refresh grants.
    #[arg(
        long,
        default_value = "https://accounts.spotify.com/api/token",
        env = "NOWFEED_TOKEN_URL"
    )]
    pub token_url: String,

    /// Upstream "currently playing" endpoint.
    #[arg(
        long,
        default_value = "https://api.spotify.com/v1/me/player/currently-playing",
        env = "NOWFEED_NOW_PLAYING_URL"
    )]
    pub now_playing_url: String,

    /// Canvas scrape mirror base URL (track id is appended).
    #[arg(
        long,
        default_value = "https://www.canvasdownloader.com/canvas?link=https://open.spotify.com/track/",
        env = "NOWFEED_CANVAS_MIRROR_URL"
    )]
    pub canvas_mirror_url: String,

    /// Web-player access-token issuing endpoint.
    #[arg(
        long,
        default_value = "https://open.spotify.com/get_access_token?reason=transport&productType=web_player",
        env = "NOWFEED_WEB_TOKEN_URL"
    )]
    pub web_token_url: String,

    /// Native canvas endpoint (binary protocol).
    #[arg(
        long,
        default_value = "https://spclient.wg.spotify.com/canvaz-cache/v0/canvases",
        env = "NOWFEED_CANVAS_URL"
    )]
    pub canvas_url: String,

    /// Path to a JSON file of seed profiles loaded into the in-memory store.
    #[arg(long, env = "NOWFEED_PROFILE_SEED")]
    pub profile_seed: Option<std::path::PathBuf>,
}

impl FeedConfig {
    pub fn playing_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.playing_poll_ms)
    }

    pub fn paused_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.paused_poll_ms)
    }

    pub fn error_retry_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.error_retry_ms)
    }

    pub fn activity_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.activity_window_secs)
    }

    pub fn token_margin(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.token_margin_secs)
    }

    pub fn session_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_ttl_secs)
    }

    pub fn hit_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.hit_window_secs)
    }

    pub fn hit_sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.hit_sweep_ms)
    }

    /// Defaults with network cadences suitable for tests (fast ticks).
    #[cfg(test)]
    pub fn test() -> Self {
        use clap::Parser;
        crate::test_support::ensure_crypto();
        // Parse from an empty arg list so clap fills in every default.
        match Self::try_parse_from(["nowfeed"]) {
            Ok(mut config) => {
                config.playing_poll_ms = 10;
                config.paused_poll_ms = 20;
                config.error_retry_ms = 10;
                config.hit_sweep_ms = 20;
                config
            }
            Err(e) => unreachable!("default config must parse: {e}"),
        }
    }
}
