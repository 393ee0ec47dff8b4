// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP routes and request handling.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, Query, State};
use axum::http::{HeaderMap, Method};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tfstated_core::{Coordinator, Operation, Reply};
use tracing::{debug, error, warn};

use crate::protocol::{self, ApiError};

/// Largest request body accepted unless configured otherwise (256 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024 * 1024;

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn Coordinator>,
    pub allow_force_unlock: bool,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(engine: Arc<dyn Coordinator>, allow_force_unlock: bool) -> Self {
        Self {
            engine,
            allow_force_unlock,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Build the router
///
/// `/state/:user/:project` accepts any method so that Terraform's `LOCK` and
/// `UNLOCK` verbs reach the handler; dispatch happens in [`protocol`].
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);
    Router::new()
        .route("/state/:user/:project", any(state_endpoint))
        .route("/lock/:user/:project", any(lock_endpoint))
        .layer(body_limit)
        .with_state(state)
}

async fn state_endpoint(
    State(app): State<AppState>,
    method: Method,
    Path((user, project)): Path<(String, String)>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(e) => return rejected(e.into()),
    };
    debug!(%method, %user, %project, bytes = body.len(), "state request");
    let op = match protocol::parse_state_request(&method, &user, &project, &query, &headers, body)
    {
        Ok(op) => op,
        Err(e) => return rejected(e.into()),
    };
    respond(&app, op).await
}

async fn lock_endpoint(
    State(app): State<AppState>,
    method: Method,
    Path((user, project)): Path<(String, String)>,
) -> Response {
    debug!(%method, %user, %project, "lock request");
    let op = match protocol::parse_lock_request(&method, &user, &project, app.allow_force_unlock)
    {
        Ok(op) => op,
        Err(e) => return rejected(e.into()),
    };
    respond(&app, op).await
}

async fn respond(app: &AppState, op: Operation) -> Response {
    let name = op.name();
    let id = op.id().clone();
    match execute(Arc::clone(&app.engine), op).await {
        Ok(reply) => protocol::reply_response(reply),
        Err(e) => {
            error!(op = name, %id, error = %e, "request failed");
            e.into_response()
        }
    }
}

fn rejected(e: ApiError) -> Response {
    warn!(error = %e, "request rejected");
    e.into_response()
}

/// Run one operation on the blocking pool, since store I/O is synchronous
pub async fn execute(engine: Arc<dyn Coordinator>, op: Operation) -> Result<Reply, ApiError> {
    tokio::task::spawn_blocking(move || engine.execute(op))
        .await
        .map_err(|e| ApiError::Task(e.to_string()))?
        .map_err(ApiError::from)
}
