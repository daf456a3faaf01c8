// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feed event types and the broadcast hub that fans them out to
//! `/ws/events` clients.
//!
//! The engine itself only depends on the [`EventSink`] trait; the hub is the
//! production implementation and the WebSocket transport subscribes to it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the feed engine, tagged with the owning user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// Per-user API-hit counter advanced.
    ApiHits { user: String, hits: u32, timestamp: u64, since_reset_ms: u64 },
    /// A user's hit window rolled over and the counter was reset.
    HitsReset { user: String, timestamp: u64 },
    /// A polling session started.
    SessionStarted { user: String, session: String },
    /// A polling session ended (explicit stop or inactivity).
    SessionStopped { user: String },
}

impl FeedEvent {
    /// Return the user identifier for this event.
    pub fn user(&self) -> &str {
        match self {
            Self::ApiHits { user, .. }
            | Self::HitsReset { user, .. }
            | Self::SessionStarted { user, .. }
            | Self::SessionStopped { user } => user,
        }
    }
}

/// Push channel the engine emits telemetry into.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit_to_user(&self, user_id: &str, event: FeedEvent);
    async fn emit_global(&self, event: FeedEvent);
}

/// Broadcast hub — fans out feed events to WebSocket clients.
pub struct EventHub {
    pub event_tx: broadcast::Sender<FeedEvent>,
}

impl EventHub {
    pub fn new() -> Arc<Self> {
        let (event_tx, _) = broadcast::channel(256);
        Arc::new(Self { event_tx })
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEvent> {
        self.event_tx.subscribe()
    }
}

#[async_trait]
impl EventSink for EventHub {
    async fn emit_to_user(&self, _user_id: &str, event: FeedEvent) {
        // Events carry their user; per-user scoping happens at the WS filter.
        let _ = self.event_tx.send(event);
    }

    async fn emit_global(&self, event: FeedEvent) {
        let _ = self.event_tx.send(event);
    }
}
