//! In-process mock of the backend API for client and flow tests.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::task::JoinHandle;

use crate::services::ApiClient;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: Value,
}

#[derive(Clone, Default)]
struct MockState {
    routes: Arc<HashMap<(Method, String), (StatusCode, Value)>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

#[derive(Default)]
pub struct MockBackendBuilder {
    routes: HashMap<(Method, String), (StatusCode, Value)>,
}

impl MockBackendBuilder {
    pub fn health(mut self, status: StatusCode, body: Value) -> Self {
        self.routes.insert((Method::GET, "/health".to_string()), (status, body));
        self
    }

    pub fn analyze(mut self, status: StatusCode, body: Value) -> Self {
        self.routes
            .insert((Method::POST, "/symptoms/analyze".to_string()), (status, body));
        self
    }

    pub fn nearby(mut self, status: StatusCode, body: Value) -> Self {
        self.routes
            .insert((Method::POST, "/doctors/nearby".to_string()), (status, body));
        self
    }

    pub fn emergency_signs(mut self, status: StatusCode, body: Value) -> Self {
        self.routes
            .insert((Method::GET, "/symptoms/emergency-signs".to_string()), (status, body));
        self
    }

    /// Healthy backend answering `/health`.
    pub fn online() -> Self {
        Self::default().health(StatusCode::OK, json!({"status": "success"}))
    }

    pub async fn spawn(self) -> MockBackend {
        let state = MockState {
            routes: Arc::new(self.routes),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        MockBackend {
            addr,
            requests,
            server,
        }
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_string();
    state.requests.lock().push(RecordedRequest {
        path: path.clone(),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    });

    match state.routes.get(&(method, path)) {
        Some((status, body)) => (*status, Json(body.clone())),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not Found"}))),
    }
}

pub struct MockBackend {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: JoinHandle<()>,
}

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::default()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.base_url(), 5, 5).unwrap()
    }

    /// Bodies received on `path`, oldest first.
    pub fn bodies(&self, path: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.path == path)
            .map(|r| r.body.clone())
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Base URL of a port nothing listens on.
pub fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}
