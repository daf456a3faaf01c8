// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for unit tests: scripted upstream API, recording event
//! sink, and pre-built profiles/states.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::FeedConfig;
use crate::error::FeedError;
use crate::events::{EventHub, EventSink, FeedEvent};
use crate::state::{epoch_ms, FeedState};
use crate::store::{MemoryStore, Profile};
use crate::upstream::{
    AlbumRef, ArtistRef, ClientCredentials, CurrentlyPlaying, ImageRef, NowPlayingApi, TokenGrant,
    TrackItem,
};

static CRYPTO_INIT: Once = Once::new();

/// Install the ring crypto provider for reqwest/rustls.
/// Safe to call multiple times — only the first call has effect.
pub fn ensure_crypto() {
    CRYPTO_INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Scripted upstream API that counts calls and replays queued responses.
///
/// When a queue is empty the mock falls back to a fixed default: a playing
/// track for `currently_playing`, a fresh one-hour grant for refresh.
pub struct MockApi {
    pub playing_calls: AtomicU32,
    pub refresh_calls: AtomicU32,
    playing_script: Mutex<VecDeque<Result<Option<CurrentlyPlaying>, FeedError>>>,
    refresh_script: Mutex<VecDeque<Result<TokenGrant, FeedError>>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            playing_calls: AtomicU32::new(0),
            refresh_calls: AtomicU32::new(0),
            playing_script: Mutex::new(VecDeque::new()),
            refresh_script: Mutex::new(VecDeque::new()),
        })
    }

    pub async fn push_playing(&self, result: Result<Option<CurrentlyPlaying>, FeedError>) {
        self.playing_script.lock().await.push_back(result);
    }

    pub async fn push_refresh(&self, result: Result<TokenGrant, FeedError>) {
        self.refresh_script.lock().await.push_back(result);
    }

    pub fn playing_count(&self) -> u32 {
        self.playing_calls.load(Ordering::Relaxed)
    }

    pub fn refresh_count(&self) -> u32 {
        self.refresh_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NowPlayingApi for MockApi {
    async fn currently_playing(
        &self,
        _access_token: &str,
    ) -> Result<Option<CurrentlyPlaying>, FeedError> {
        self.playing_calls.fetch_add(1, Ordering::Relaxed);
        match self.playing_script.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(Some(playing_track("t1", "Test Track", true))),
        }
    }

    async fn refresh_access_token(
        &self,
        _credentials: &ClientCredentials,
    ) -> Result<TokenGrant, FeedError> {
        self.refresh_calls.fetch_add(1, Ordering::Relaxed);
        match self.refresh_script.lock().await.pop_front() {
            Some(result) => result,
            None => Ok(TokenGrant { access_token: "fresh-token".to_owned(), expires_in: 3600 }),
        }
    }
}

/// Event sink that records everything it is given.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FeedEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn events(&self) -> Vec<FeedEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit_to_user(&self, _user_id: &str, event: FeedEvent) {
        self.events.lock().await.push(event);
    }

    async fn emit_global(&self, event: FeedEvent) {
        self.events.lock().await.push(event);
    }
}

/// A playing-track payload.
pub fn playing_track(id: &str, name: &str, is_playing: bool) -> CurrentlyPlaying {
    CurrentlyPlaying {
        is_playing,
        progress_ms: Some(30_000),
        currently_playing_type: Some("track".to_owned()),
        item: Some(TrackItem {
            id: Some(id.to_owned()),
            name: name.to_owned(),
            duration_ms: 120_000,
            artists: vec![
                ArtistRef { name: "Artist A".to_owned() },
                ArtistRef { name: "Artist B".to_owned() },
            ],
            album: Some(AlbumRef {
                name: "Album".to_owned(),
                images: vec![ImageRef { url: "https://img.example/cover.jpg".to_owned() }],
            }),
        }),
    }
}

/// A profile with full credentials, active as of now.
pub fn active_profile() -> Profile {
    Profile {
        is_active: true,
        last_activity: Some(epoch_ms()),
        session_expires_at: Some(epoch_ms() + 3_600_000),
        access_token: None,
        refresh_token: Some("refresh-token".to_owned()),
        client_id: Some("client-id".to_owned()),
        client_secret: Some("client-secret".to_owned()),
    }
}

/// Assembled test state plus handles to its collaborators.
pub struct TestCtx {
    pub state: Arc<FeedState>,
    pub store: Arc<MemoryStore>,
    pub api: Arc<MockApi>,
    pub sink: Arc<RecordingSink>,
}

/// Build a `FeedState` over a fresh memory store, scripted API, and
/// recording sink, using fast test cadences.
pub fn test_state() -> TestCtx {
    test_state_with_config(FeedConfig::test())
}

pub fn test_state_with_config(config: FeedConfig) -> TestCtx {
    let store = Arc::new(MemoryStore::new());
    let api = MockApi::new();
    let sink = RecordingSink::new();
    let state = Arc::new(FeedState::with_sink(
        config,
        Arc::clone(&store) as Arc<dyn crate::store::ProfileStore>,
        Arc::clone(&api) as Arc<dyn NowPlayingApi>,
        Arc::clone(&sink) as Arc<dyn EventSink>,
        EventHub::new(),
        CancellationToken::new(),
    ));
    TestCtx { state, store, api, sink }
}
