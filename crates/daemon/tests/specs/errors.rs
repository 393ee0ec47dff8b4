// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error mapping specs
//!
//! Verify rejected requests and storage failures map to the right status.

use crate::prelude::*;
use tfstated_core::MemoryStore;

#[tokio::test]
async fn invalid_identifier_is_bad_request() {
    let backend = Backend::start().await;

    let resp = backend.send("GET", "/state/.hidden/proj1", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = backend.send("GET", "/state/alice/pro%2Fj", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_identifier_touches_nothing() {
    let backend = Backend::start().await;

    backend.put("/state/..x/proj1", "v1", None).await;

    let state_dir = backend.data_dir.join("state");
    assert_eq!(std::fs::read_dir(state_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn malformed_lock_info_is_bad_request() {
    let backend = Backend::start().await;

    let (status, body) = status_of(backend.send("LOCK", "/state/alice/proj1", "not json").await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");

    let resp = backend.send("LOCK", "/state/alice/proj1", r#"{"ID":""}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unsupported_method_is_not_allowed() {
    let backend = Backend::start().await;

    let resp = backend.send("PATCH", "/state/alice/proj1", "").await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let backend = Backend::start().await;

    let resp = backend.send("GET", "/state/alice", "").await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_failure_is_internal_error_and_state_unchanged() {
    let store = MemoryStore::new();
    let backend = Backend::in_memory(store.clone()).await;
    backend.put("/state/alice/proj1", "v1", None).await;

    store.set_failing(true);
    let (status, body) = status_of(backend.put("/state/alice/proj1", "v2", None).await).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal Server Error");

    let resp = backend.lock("/state/alice/proj1", "tok1").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    store.set_failing(false);
    assert_eq!(backend.get("/state/alice/proj1").await.1, b"v1");
    assert_eq!(backend.lock("/state/alice/proj1", "tok1").await.status(), StatusCode::OK);
}
