// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locking specs
//!
//! Verify LOCK/UNLOCK semantics and lock-checked writes over HTTP.

use crate::prelude::*;

const STATE: &str = "/state/alice/proj1";

#[tokio::test]
async fn terraform_session_end_to_end() {
    let backend = Backend::start().await;

    let (status, body) = status_of(backend.lock(STATE, "tok1").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Locked"}));

    let resp = backend.put(STATE, "v1", Some("tok1")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let (status, holder) = status_of(backend.lock(STATE, "tok2").await).await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(holder, lock_info("tok1"));

    let resp = backend.put(STATE, "v2", Some("tok2")).await;
    assert_eq!(resp.status(), StatusCode::LOCKED);
    assert_eq!(backend.get(STATE).await.1, b"v1");

    let (status, holder) = status_of(backend.unlock(STATE, "tok2").await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(holder, lock_info("tok1"));

    let (status, body) = status_of(backend.unlock(STATE, "tok1").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Unlocked"}));

    assert_eq!(backend.lock(STATE, "tok2").await.status(), StatusCode::OK);
    assert_eq!(backend.put(STATE, "v2", Some("tok2")).await.status(), StatusCode::OK);
    assert_eq!(backend.get(STATE).await.1, b"v2");
}

#[tokio::test]
async fn lock_record_is_persisted() {
    let backend = Backend::start().await;

    backend.lock(STATE, "tok1").await;

    let path = backend.data_dir.join("lock/alice/proj1.lock");
    let record: Value = serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    assert_eq!(record["token"], "tok1");
    assert_eq!(record["holder"], lock_info("tok1"));
}

#[tokio::test]
async fn relock_with_same_token_conflicts() {
    let backend = Backend::start().await;
    backend.lock(STATE, "tok1").await;

    assert_eq!(backend.lock(STATE, "tok1").await.status(), StatusCode::LOCKED);
}

#[tokio::test]
async fn write_without_token_on_locked_state_conflicts() {
    let backend = Backend::start().await;
    backend.put(STATE, "v1", None).await;
    backend.lock(STATE, "tok1").await;

    let (status, holder) = status_of(backend.put(STATE, "v2", None).await).await;

    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(holder["ID"], "tok1");
    assert_eq!(backend.get(STATE).await.1, b"v1");
}

#[tokio::test]
async fn token_in_lock_id_header_is_honored() {
    let backend = Backend::start().await;
    backend.lock(STATE, "tok1").await;

    let resp = reqwest::Client::new()
        .post(format!("{}{STATE}", backend.base))
        .header("Lock-ID", "tok1")
        .body("v1")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(backend.get(STATE).await.1, b"v1");
}

#[tokio::test]
async fn unlock_of_unlocked_state_succeeds() {
    let backend = Backend::start().await;

    assert_eq!(backend.unlock(STATE, "tok1").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn strict_unlock_reports_missing_lock() {
    let backend = Backend::with_config(|c| c.policy.strict_unlock = true).await;

    assert_eq!(backend.unlock(STATE, "tok1").await.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn required_lock_rejects_unlocked_writes() {
    let backend = Backend::with_config(|c| c.policy.require_lock_for_write = true).await;

    let resp = backend.put(STATE, "v1", None).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_REQUIRED);
    assert!(backend.get(STATE).await.1.is_empty());

    backend.lock(STATE, "tok1").await;
    assert_eq!(backend.put(STATE, "v1", Some("tok1")).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn concurrent_locks_have_one_winner() {
    let backend = Backend::start().await;

    let (a, b) = tokio::join!(backend.lock(STATE, "tok1"), backend.lock(STATE, "tok2"));
    let mut statuses = [a.status(), b.status()];
    statuses.sort();

    assert_eq!(statuses, [StatusCode::OK, StatusCode::LOCKED]);
}

#[tokio::test]
async fn lock_status_shows_holder() {
    let backend = Backend::start().await;

    let resp = backend.send("GET", "/lock/alice/proj1", "").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    backend.lock(STATE, "tok1").await;
    let (status, holder) = status_of(backend.send("GET", "/lock/alice/proj1", "").await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(holder, lock_info("tok1"));
}

#[tokio::test]
async fn force_unlock_is_forbidden_by_default() {
    let backend = Backend::start().await;
    backend.lock(STATE, "tok1").await;

    let resp = backend.send("DELETE", "/lock/alice/proj1", "").await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(backend.lock(STATE, "tok2").await.status(), StatusCode::LOCKED);
}

#[tokio::test]
async fn force_unlock_clears_any_lock_when_enabled() {
    let backend = Backend::with_config(|c| c.policy.allow_force_unlock = true).await;
    backend.lock(STATE, "tok1").await;

    let (status, body) = status_of(backend.send("DELETE", "/lock/alice/proj1", "").await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "Unlocked"}));
    assert_eq!(backend.lock(STATE, "tok2").await.status(), StatusCode::OK);
}
