//! Test harness for the REST integration tests.
//!
//! Spawns the full router on a random local port, backed by either the
//! in-memory store or a SQLite database in a temp directory.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use adoptiverse_api::rest::{AppState, create_router};
use adoptiverse_api::{DataStore, MemoryStore, PetUpdateLookup, SqliteStore};
use reqwest::{Client, Response};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    base_url: String,
    client: Client,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// In-memory store, global pet update lookup.
    pub async fn spawn() -> Self {
        Self::spawn_with(Arc::new(MemoryStore::new()), PetUpdateLookup::Global).await
    }

    pub async fn spawn_scoped() -> Self {
        Self::spawn_with(Arc::new(MemoryStore::new()), PetUpdateLookup::Scoped).await
    }

    /// SQLite store under `data_dir`.
    pub async fn spawn_sqlite(data_dir: &Path) -> Self {
        let store = SqliteStore::open(data_dir)
            .await
            .expect("failed to open sqlite store");
        Self::spawn_with(Arc::new(store), PetUpdateLookup::Global).await
    }

    pub async fn spawn_with(store: Arc<dyn DataStore>, lookup: PetUpdateLookup) -> Self {
        let port = portpicker::pick_unused_port().expect("no free port");
        let addr = format!("127.0.0.1:{}", port);

        let state = Arc::new(AppState::new(store, lookup));
        let router = create_router(state);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .expect("failed to bind test listener");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("server failed");
        });

        Self {
            base_url: format!("http://{}", addr),
            client: Client::new(),
            shutdown_tx: Some(shutdown_tx),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("GET failed")
    }

    pub async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn put_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Response {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT failed")
    }

    /// POST a raw body with a JSON content type.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> Response {
        self.client
            .post(self.url(path))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("POST failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE failed")
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = self.handle.await;
    }
}
