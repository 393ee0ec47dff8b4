// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP wire contract of the Terraform `http` backend
//!
//! Parses method + path + body into an engine [`Operation`] and maps each
//! [`Reply`] back to a status code and body.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tfstated_core::{
    EngineError, IdError, LockOutcome, LockToken, Operation, Reply, ResourceId, UnlockOutcome,
    WriteOutcome,
};
use thiserror::Error;

/// Query parameter Terraform uses to present its lock ID on writes
pub const LOCK_ID_QUERY: &str = "ID";
/// Header alternative to [`LOCK_ID_QUERY`]
pub const LOCK_ID_HEADER: &str = "lock-id";

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid resource identifier: {0}")]
    InvalidIdentifier(#[from] IdError),
    #[error("method {0} not allowed")]
    MethodNotAllowed(Method),
    #[error("invalid lock info: {0}")]
    InvalidLockInfo(String),
    #[error("force unlock is disabled")]
    ForceUnlockDisabled,
}

/// The part of Terraform's lock info the server relies on
///
/// The full object is kept verbatim as holder metadata.
#[derive(Debug, Deserialize)]
struct LockInfo {
    #[serde(rename = "ID")]
    id: String,
}

/// Parse a request against `/state/{user}/{project}`
pub fn parse_state_request(
    method: &Method,
    user: &str,
    project: &str,
    query: &HashMap<String, String>,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Operation, ProtocolError> {
    let id = ResourceId::derive(user, project)?;

    match method.as_str() {
        "GET" => Ok(Operation::GetState { id }),
        "POST" | "PUT" => Ok(Operation::PutState {
            id,
            body: body.to_vec(),
            token: write_token(query, headers),
        }),
        "DELETE" => Ok(Operation::DeleteState {
            id,
            token: write_token(query, headers),
        }),
        "LOCK" => {
            let (token, holder) = parse_lock_info(&body)?;
            Ok(Operation::Lock { id, token, holder })
        }
        "UNLOCK" if body.is_empty() => Err(ProtocolError::InvalidLockInfo(
            "UNLOCK needs the lock info body; force-unlock with DELETE /lock/{user}/{project}"
                .to_string(),
        )),
        "UNLOCK" => {
            let (token, _) = parse_lock_info(&body)?;
            Ok(Operation::Unlock { id, token })
        }
        _ => Err(ProtocolError::MethodNotAllowed(method.clone())),
    }
}

/// Parse a request against `/lock/{user}/{project}`
pub fn parse_lock_request(
    method: &Method,
    user: &str,
    project: &str,
    allow_force_unlock: bool,
) -> Result<Operation, ProtocolError> {
    let id = ResourceId::derive(user, project)?;

    match *method {
        Method::GET => Ok(Operation::LockStatus { id }),
        Method::DELETE if allow_force_unlock => Ok(Operation::ForceUnlock { id }),
        Method::DELETE => Err(ProtocolError::ForceUnlockDisabled),
        _ => Err(ProtocolError::MethodNotAllowed(method.clone())),
    }
}

/// Lock ID from the `ID` query parameter, else the `Lock-ID` header
fn write_token(query: &HashMap<String, String>, headers: &HeaderMap) -> Option<LockToken> {
    query
        .get(LOCK_ID_QUERY)
        .cloned()
        .or_else(|| {
            headers
                .get(LOCK_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .filter(|t| !t.is_empty())
        .map(LockToken::new)
}

fn parse_lock_info(body: &[u8]) -> Result<(LockToken, Value), ProtocolError> {
    let holder: Value =
        serde_json::from_slice(body).map_err(|e| ProtocolError::InvalidLockInfo(e.to_string()))?;
    let info = LockInfo::deserialize(&holder)
        .map_err(|e| ProtocolError::InvalidLockInfo(e.to_string()))?;
    if info.id.is_empty() {
        return Err(ProtocolError::InvalidLockInfo("lock ID is empty".to_string()));
    }
    Ok((LockToken::new(info.id), holder))
}

/// Success body, e.g. `{"status":"Locked"}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct StatusBody {
    pub status: String,
}

/// Error body, e.g. `{"error":"Conflict","message":"..."}`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

fn status(text: &str) -> Response {
    Json(StatusBody {
        status: text.to_string(),
    })
    .into_response()
}

fn error(code: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: code.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
    };
    (code, Json(body)).into_response()
}

/// Lock holder metadata, returned verbatim so clients can show who holds it
fn holder(code: StatusCode, holder: Value) -> Response {
    (code, Json(holder)).into_response()
}

/// Map an engine reply to its HTTP response
pub fn reply_response(reply: Reply) -> Response {
    match reply {
        Reply::State(bytes) if bytes.is_empty() => StatusCode::OK.into_response(),
        Reply::State(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            bytes,
        )
            .into_response(),
        Reply::Written(outcome) => write_response(outcome, "Created"),
        Reply::Deleted(outcome) => write_response(outcome, "Deleted"),
        Reply::Lock(LockOutcome::Locked) => status("Locked"),
        Reply::Lock(LockOutcome::Conflict(existing)) => {
            holder(StatusCode::LOCKED, existing.holder)
        }
        Reply::Unlock(UnlockOutcome::Unlocked) => status("Unlocked"),
        Reply::Unlock(UnlockOutcome::Mismatch(existing)) => {
            holder(StatusCode::CONFLICT, existing.holder)
        }
        Reply::Unlock(UnlockOutcome::NotLocked) => {
            error(StatusCode::CONFLICT, "Lock does not exist.")
        }
        Reply::LockStatus(Some(record)) => holder(StatusCode::OK, record.holder),
        Reply::LockStatus(None) => error(StatusCode::NOT_FOUND, "Not locked"),
        Reply::ForceUnlocked(_) => status("Unlocked"),
    }
}

fn write_response(outcome: WriteOutcome, done: &str) -> Response {
    match outcome {
        WriteOutcome::Applied => status(done),
        WriteOutcome::Conflict(existing) => holder(StatusCode::LOCKED, existing.holder),
        WriteOutcome::LockRequired => error(
            StatusCode::PRECONDITION_REQUIRED,
            "A lock is required to write state",
        ),
    }
}

/// Failures surfaced to the client
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("failed to read request body: {0}")]
    Body(#[from] BytesRejection),
    #[error("request task failed: {0}")]
    Task(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Protocol(ProtocolError::InvalidIdentifier(_))
            | ApiError::Protocol(ProtocolError::InvalidLockInfo(_))
            | ApiError::Engine(EngineError::EmptyToken) => StatusCode::BAD_REQUEST,
            ApiError::Protocol(ProtocolError::MethodNotAllowed(_)) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            ApiError::Protocol(ProtocolError::ForceUnlockDisabled) => StatusCode::FORBIDDEN,
            ApiError::Body(rejection) => rejection.status(),
            ApiError::Engine(EngineError::Storage(_)) | ApiError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.status_code();
        let message = if code == StatusCode::INTERNAL_SERVER_ERROR {
            format!("An unexpected error occurred:\n{self}\n")
        } else {
            self.to_string()
        };
        error(code, message)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
