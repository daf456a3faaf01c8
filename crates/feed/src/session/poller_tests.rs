// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::store::Profile;
use crate::test_support::{active_profile, playing_track, test_state};

// ── next_delay ────────────────────────────────────────────────────────

#[test]
fn cadence_subtracts_processing_time() {
    assert_eq!(
        next_delay(Duration::from_millis(1000), Duration::from_millis(300)),
        Duration::from_millis(700)
    );
    assert_eq!(
        next_delay(Duration::from_millis(5000), Duration::from_millis(1200)),
        Duration::from_millis(3800)
    );
}

#[test]
fn cadence_floors_at_zero_when_tick_runs_long() {
    assert_eq!(next_delay(Duration::from_millis(1000), Duration::from_millis(1500)), Duration::ZERO);
}

// ── run_tick ──────────────────────────────────────────────────────────

#[tokio::test]
async fn inactive_user_makes_no_network_call() {
    let ctx = test_state();
    ctx.store.put_profile("u1", Profile { is_active: false, ..active_profile() }).await;
    let entry = SessionEntry::new("u1", "s1".to_owned());

    let outcome = run_tick(&ctx.state, &entry).await;
    assert!(matches!(outcome, Ok(TickOutcome::Stop)));
    assert_eq!(ctx.api.playing_count(), 0);
    assert_eq!(ctx.api.refresh_count(), 0);
    // No hit counted either: the gate short-circuits before accounting.
    assert_eq!(entry.api_hits.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn tick_persists_normalized_track() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    ctx.api.push_playing(Ok(Some(playing_track("t1", "Song", true)))).await;
    let entry = SessionEntry::new("u1", "s1".to_owned());

    let outcome = run_tick(&ctx.state, &entry).await;
    assert!(matches!(outcome, Ok(TickOutcome::Continue { is_playing: true })));

    let track = ctx.store.get_track("u1").await;
    let track = track.ok_or_else(|| anyhow::anyhow!("no track stored"))?;
    assert_eq!(track.id, "t1");
    assert_eq!(track.artist, "Artist A, Artist B");
    assert!(track.is_playing);
    assert!(!entry.is_paused.load(Ordering::Relaxed));
    Ok(())
}

#[tokio::test]
async fn idle_playback_stores_blank_record_and_pauses() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    ctx.api.push_playing(Ok(None)).await;
    let entry = SessionEntry::new("u1", "s1".to_owned());

    let outcome = run_tick(&ctx.state, &entry).await;
    assert!(matches!(outcome, Ok(TickOutcome::Continue { is_playing: false })));

    let track = ctx.store.get_track("u1").await;
    let track = track.ok_or_else(|| anyhow::anyhow!("no track stored"))?;
    assert!(track.id.is_empty());
    assert!(!track.is_playing);
    assert!(entry.is_paused.load(Ordering::Relaxed));
    Ok(())
}

#[tokio::test]
async fn auth_rejection_invalidates_cached_token() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    ctx.api.push_playing(Err(crate::error::FeedError::upstream_status(401, "expired"))).await;
    let entry = SessionEntry::new("u1", "s1".to_owned());

    let outcome = run_tick(&ctx.state, &entry).await;
    assert!(outcome.is_err());
    assert!(ctx.state.tokens.cached("u1").await.is_none());
    Ok(())
}

#[tokio::test]
async fn tick_emits_hit_telemetry() {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    let entry = SessionEntry::new("u1", "s1".to_owned());

    let _ = run_tick(&ctx.state, &entry).await;

    let events = ctx.sink.events().await;
    assert!(events.iter().any(|e| matches!(
        e,
        crate::events::FeedEvent::ApiHits { user, hits: 1, .. } if user == "u1"
    )));
}

// ── full loop ─────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_tick_reschedules_instead_of_dying() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    ctx.api.push_playing(Err(crate::error::FeedError::upstream("boom"))).await;

    ctx.state.start_session("u1").await?;
    tokio::time::sleep(Duration::from_millis(100)).await;

    // First tick failed; the loop must have kept going past it.
    assert!(ctx.api.playing_count() >= 2, "loop died after one failure");
    assert_eq!(ctx.state.session_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn stopped_session_ticks_no_more() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;

    ctx.state.start_session("u1").await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    ctx.state.stop_session("u1").await;

    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_stop = ctx.api.playing_count();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(ctx.api.playing_count(), after_stop, "ghost tick after stop");
    Ok(())
}

#[tokio::test]
async fn gate_failure_retires_the_session() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;

    ctx.state.start_session("u1").await?;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(ctx.state.session_count().await, 1);

    // Flip the flag off; the next tick's gate check should retire the entry.
    ctx.store.put_profile("u1", Profile { is_active: false, ..active_profile() }).await;
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(ctx.state.session_count().await, 0);
    Ok(())
}
