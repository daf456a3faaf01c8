// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use crate::canvas::CanvasResolver;
use crate::config::FeedConfig;
use crate::credential::manager::TokenManager;
use crate::events::{EventHub, EventSink};
use crate::gate::ActivityGate;
use crate::session::SessionEntry;
use crate::store::ProfileStore;
use crate::upstream::NowPlayingApi;

/// Shared engine state.
pub struct FeedState {
    pub config: FeedConfig,
    pub store: Arc<dyn ProfileStore>,
    pub api: Arc<dyn NowPlayingApi>,
    pub sink: Arc<dyn EventSink>,
    /// Broadcast hub behind `sink` in production; `/ws/events` subscribes here.
    pub hub: Arc<EventHub>,
    pub gate: ActivityGate,
    pub tokens: TokenManager,
    pub sessions: RwLock<HashMap<String, Arc<SessionEntry>>>,
    pub canvas: CanvasResolver,
    pub shutdown: CancellationToken,
}

impl FeedState {
    pub fn new(
        config: FeedConfig,
        store: Arc<dyn ProfileStore>,
        api: Arc<dyn NowPlayingApi>,
        shutdown: CancellationToken,
    ) -> Self {
        let hub = EventHub::new();
        let sink: Arc<dyn EventSink> = Arc::clone(&hub) as Arc<dyn EventSink>;
        Self::with_sink(config, store, api, sink, hub, shutdown)
    }

    /// Construct with an explicit event sink (tests substitute a recorder).
    pub fn with_sink(
        config: FeedConfig,
        store: Arc<dyn ProfileStore>,
        api: Arc<dyn NowPlayingApi>,
        sink: Arc<dyn EventSink>,
        hub: Arc<EventHub>,
        shutdown: CancellationToken,
    ) -> Self {
        let gate = ActivityGate::new(Arc::clone(&store), config.activity_window());
        let tokens = TokenManager::new(
            Arc::clone(&store),
            Arc::clone(&api),
            gate.clone(),
            config.token_margin(),
            config.refresh_attempts,
        );
        let canvas = CanvasResolver::new(&config);
        Self {
            config,
            store,
            api,
            sink,
            hub,
            gate,
            tokens,
            sessions: RwLock::new(HashMap::new()),
            canvas,
            shutdown,
        }
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
