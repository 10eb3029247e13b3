//! Shared test utilities for the load-actor workspace.
//!
//! The main piece is [`RecordingServer`], an in-process HTTP server that
//! records every request it receives, for integration tests that need to
//! observe what an actor actually sent.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tokio::sync::oneshot;

/// One request observed by [`RecordingServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// The request body as UTF-8 text.
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    status: StatusCode,
}

/// In-process HTTP server that answers every request with a fixed status
/// and records what it saw. The server runs on its own thread with its own
/// runtime, so blocking clients can talk to it from any test thread.
pub struct RecordingServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl RecordingServer {
    /// Start a server answering 200 OK to everything.
    pub fn start() -> Self {
        Self::with_status(200)
    }

    /// Start a server answering `status` to everything.
    pub fn with_status(status: u16) -> Self {
        let status = StatusCode::from_u16(status).expect("invalid status code");
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();
        let state = ServerState {
            requests: Arc::clone(&requests),
            status,
        };

        let (addr_tx, addr_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build test server runtime");
            runtime.block_on(async move {
                let app = Router::new().fallback(record).with_state(state);
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("failed to bind test server");
                let addr = listener.local_addr().expect("test server has no local addr");
                addr_tx.send(addr).ok();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        shutdown_rx.await.ok();
                    })
                    .await
                    .expect("test server failed");
            });
        });

        let addr = addr_rx.recv().expect("test server did not start");
        Self {
            addr,
            requests,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Base URL of the server, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Snapshot of everything received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("request log poisoned").clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("request log poisoned").len()
    }
}

impl Drop for RecordingServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

async fn record(
    State(state): State<ServerState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    let recorded = RecordedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        body: body.to_vec(),
    };
    state
        .requests
        .lock()
        .expect("request log poisoned")
        .push(recorded);
    (state.status, "ok")
}

/// An address nothing is listening on; connections to it are refused.
///
/// The port is reserved briefly and released, so a race with another test
/// binding it is possible but unlikely.
pub fn refused_endpoint() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to reserve a port");
    let addr = listener.local_addr().expect("reserved port has no local addr");
    drop(listener);
    format!("http://{addr}")
}
