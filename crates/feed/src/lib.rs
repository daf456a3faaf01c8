// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nowfeed: per-user "currently playing" session engine.
//!
//! Keeps a live now-playing feed in sync with the upstream player on behalf
//! of many concurrently active users, each with independent OAuth
//! credentials, polling cadence, and idle/active lifecycle.

pub mod canvas;
pub mod config;
pub mod credential;
pub mod error;
pub mod events;
pub mod gate;
pub mod session;
pub mod state;
pub mod store;
pub mod transport;
pub mod upstream;

#[cfg(test)]
pub mod test_support;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::config::FeedConfig;
use crate::session::hits::spawn_hit_sweeper;
use crate::state::FeedState;
use crate::store::{MemoryStore, ProfileStore};
use crate::transport::build_router;
use crate::upstream::client::SpotifyClient;

/// Run the feed engine until shutdown.
pub async fn run(config: FeedConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let shutdown = CancellationToken::new();

    let store: Arc<dyn ProfileStore> = match config.profile_seed {
        Some(ref path) => Arc::new(MemoryStore::from_seed_file(path)?),
        None => Arc::new(MemoryStore::new()),
    };
    let api = Arc::new(SpotifyClient::new(&config));
    let state = Arc::new(FeedState::new(config, store, api, shutdown.clone()));

    // Poll state is never persisted; rebuild sessions from the profile store.
    let resumed = state.resume_active_sessions().await;
    if resumed > 0 {
        tracing::info!(resumed, "resumed active sessions");
    }

    spawn_hit_sweeper(Arc::clone(&state));

    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown.cancel();
        });
    }

    tracing::info!("nowfeed listening on {addr}");
    let router = build_router(Arc::clone(&state));
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown.cancelled_owned()).await?;

    state.stop_all().await;
    Ok(())
}
