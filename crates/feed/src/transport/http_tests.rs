// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;

use crate::config::FeedConfig;
use crate::test_support::{active_profile, test_state, test_state_with_config, TestCtx};
use crate::transport::build_router;

fn server(ctx: &TestCtx) -> anyhow::Result<TestServer> {
    Ok(TestServer::new(build_router(std::sync::Arc::clone(&ctx.state)))?)
}

#[tokio::test]
async fn health_is_open_and_counts_sessions() -> anyhow::Result<()> {
    let ctx = test_state();
    let server = server(&ctx)?;

    let res = server.get("/api/v1/health").await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["status"], "running");
    assert_eq!(body["session_count"], 0);
    Ok(())
}

#[tokio::test]
async fn start_without_credentials_is_unauthorized() -> anyhow::Result<()> {
    let ctx = test_state();
    let server = server(&ctx)?;

    let res = server.post("/api/v1/sessions/unknown").await;
    assert_eq!(res.status_code(), 401);
    let body: serde_json::Value = res.json();
    assert_eq!(body["error"]["code"], "CREDENTIALS_MISSING");
    Ok(())
}

#[tokio::test]
async fn session_lifecycle_over_http() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    let server = server(&ctx)?;

    // Start.
    let res = server.post("/api/v1/sessions/u1").await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["is_polling"], true);
    let session_id = body["session_id"].as_str().unwrap_or_default().to_owned();
    assert!(!session_id.is_empty());

    // Listed.
    let res = server.get("/api/v1/sessions").await;
    res.assert_status_ok();
    let list: serde_json::Value = res.json();
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    // Activity ping: live id accepted, stale id rejected.
    let res = server
        .post("/api/v1/sessions/u1/activity")
        .json(&serde_json::json!({ "session_id": session_id }))
        .await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["accepted"], true);

    let res = server
        .post("/api/v1/sessions/u1/activity")
        .json(&serde_json::json!({ "session_id": "stale" }))
        .await;
    let body: serde_json::Value = res.json();
    assert_eq!(body["accepted"], false);

    // Stats exist while live.
    let res = server.get("/api/v1/sessions/u1/stats").await;
    res.assert_status_ok();

    // Stop is idempotent.
    let res = server.delete("/api/v1/sessions/u1").await;
    res.assert_status_ok();
    let body: serde_json::Value = res.json();
    assert_eq!(body["stopped"], true);

    let res = server.delete("/api/v1/sessions/u1").await;
    let body: serde_json::Value = res.json();
    assert_eq!(body["stopped"], false);

    // Stats are gone with the session.
    let res = server.get("/api/v1/sessions/u1/stats").await;
    assert_eq!(res.status_code(), 404);
    Ok(())
}

#[tokio::test]
async fn track_endpoint_serves_last_poll_result() -> anyhow::Result<()> {
    let ctx = test_state();
    ctx.store.put_profile("u1", active_profile()).await;
    let server = server(&ctx)?;

    let res = server.get("/api/v1/sessions/u1/track").await;
    assert_eq!(res.status_code(), 404);

    server.post("/api/v1/sessions/u1").await.assert_status_ok();
    // Let the poller complete at least one tick.
    tokio::time::sleep(std::time::Duration::from_millis(80)).await;

    let res = server.get("/api/v1/sessions/u1/track").await;
    res.assert_status_ok();
    let track: serde_json::Value = res.json();
    assert_eq!(track["id"], "t1");
    assert_eq!(track["is_playing"], true);
    Ok(())
}

#[tokio::test]
async fn bearer_auth_guards_api_routes() -> anyhow::Result<()> {
    let mut config = FeedConfig::test();
    config.auth_token = Some("secret-token".to_owned());
    let ctx = test_state_with_config(config);
    let server = server(&ctx)?;

    // Health stays open.
    server.get("/api/v1/health").await.assert_status_ok();

    let res = server.get("/api/v1/sessions").await;
    assert_eq!(res.status_code(), 401);

    let res = server
        .get("/api/v1/sessions")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_static("Bearer secret-token"),
        )
        .await;
    res.assert_status_ok();
    Ok(())
}
