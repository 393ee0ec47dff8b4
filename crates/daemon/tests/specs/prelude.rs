// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for HTTP specs

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tfstated_core::{Engine, MemoryStore, Policy, SystemClock};
use tfstated_daemon::{router, startup, AppState, Config};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub use reqwest::{Method, StatusCode};
pub use serde_json::{json, Value};

/// A server running in this process on an ephemeral port
pub struct Backend {
    pub base: String,
    pub data_dir: PathBuf,
    client: reqwest::Client,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    _temp: Option<TempDir>,
}

impl Backend {
    pub async fn start() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(configure: impl FnOnce(&mut Config)) -> Self {
        let temp = TempDir::new().unwrap();
        let mut config = Config {
            listen: "127.0.0.1:0".to_string(),
            data_dir: temp.path().join("data"),
            ..Config::default()
        };
        configure(&mut config);

        let daemon = startup(&config).await.unwrap();
        let addr = daemon.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            daemon
                .run(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            data_dir: config.data_dir,
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            task: Some(task),
            _temp: Some(temp),
        }
    }

    /// Server over an in-memory store, for failure injection
    pub async fn in_memory(store: MemoryStore) -> Self {
        let engine = Engine::new(store, SystemClock, Policy::default());
        let app = router(AppState::new(Arc::new(engine), false));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            data_dir: PathBuf::new(),
            client: reqwest::Client::new(),
            shutdown: Some(tx),
            task: Some(task),
            _temp: None,
        }
    }

    pub async fn send(&self, method: &str, path: &str, body: impl Into<String>) -> reqwest::Response {
        let method = Method::from_bytes(method.as_bytes()).unwrap();
        self.client
            .request(method, format!("{}{}", self.base, path))
            .body(body.into())
            .send()
            .await
            .unwrap()
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Vec<u8>) {
        let resp = self.send("GET", path, "").await;
        let status = resp.status();
        (status, resp.bytes().await.unwrap().to_vec())
    }

    /// POST the document, presenting `token` as Terraform does (`?ID=`)
    pub async fn put(&self, path: &str, body: &str, token: Option<&str>) -> reqwest::Response {
        let path = match token {
            Some(token) => format!("{path}?ID={token}"),
            None => path.to_string(),
        };
        self.send("POST", &path, body).await
    }

    pub async fn lock(&self, path: &str, id: &str) -> reqwest::Response {
        self.send("LOCK", path, lock_info(id).to_string()).await
    }

    pub async fn unlock(&self, path: &str, id: &str) -> reqwest::Response {
        self.send("UNLOCK", path, lock_info(id).to_string()).await
    }

    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await.unwrap();
        }
    }
}

impl Drop for Backend {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Terraform's LockInfo object
pub fn lock_info(id: &str) -> Value {
    json!({
        "ID": id,
        "Operation": "OperationTypeApply",
        "Info": "",
        "Who": format!("{id}@workstation"),
        "Version": "1.9.0",
        "Created": "2026-01-01T00:00:00Z",
        "Path": "",
    })
}

pub async fn body_json(resp: reqwest::Response) -> Value {
    resp.json().await.unwrap()
}

pub async fn status_of(resp: reqwest::Response) -> (StatusCode, Value) {
    let status = resp.status();
    (status, body_json(resp).await)
}
