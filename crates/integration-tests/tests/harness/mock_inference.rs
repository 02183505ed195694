//! Mock inference backend for integration tests
//!
//! Accepts raw audio on `POST /models/whisper` and answers like a hosted
//! speech recognition endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

/// How the mock answers each request
#[derive(Clone)]
enum Behavior {
    /// Reply `{"text": <text>}`
    Transcribe(String),
    /// Reply with the uploaded bytes as the transcription
    Echo { delay: Duration },
    /// Reply with `status` and a raw body
    Fail { status: StatusCode, body: String },
    /// Sleep before replying with a transcription
    Stall(Duration),
}

/// One request as seen by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Names of the files in the staging directory while the request was handled
    pub staged_files: Vec<String>,
}

/// Mock inference backend returning predictable responses
pub struct MockInference {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    request_count: AtomicU32,
    behavior: Behavior,
    staging_dir: Option<PathBuf>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockInference {
    /// Start a mock that transcribes every upload to `text`
    pub async fn start_with_text(text: &str) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Transcribe(text.to_owned()), None).await
    }

    /// Start a mock that transcribes to `text` and records the staging directory contents
    pub async fn start_observing(text: &str, staging_dir: PathBuf) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Transcribe(text.to_owned()), Some(staging_dir)).await
    }

    /// Start a mock that echoes each upload back after `delay`
    pub async fn start_echo(delay: Duration, staging_dir: PathBuf) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Echo { delay }, Some(staging_dir)).await
    }

    /// Start a mock that fails every request
    pub async fn start_failing(status: u16, body: &str) -> anyhow::Result<Self> {
        let status = StatusCode::from_u16(status)?;
        Self::start_inner(
            Behavior::Fail {
                status,
                body: body.to_owned(),
            },
            None,
        )
        .await
    }

    /// Start a mock that waits `delay` before answering
    pub async fn start_stalled(delay: Duration) -> anyhow::Result<Self> {
        Self::start_inner(Behavior::Stall(delay), None).await
    }

    async fn start_inner(behavior: Behavior, staging_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            request_count: AtomicU32::new(0),
            behavior,
            staging_dir,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/models/whisper", routing::post(handle_transcribe))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Endpoint URL to configure as the inference endpoint
    pub fn endpoint(&self) -> String {
        format!("http://{}/models/whisper", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("mock state lock").clone()
    }
}

impl Drop for MockInference {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_transcribe(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    state.request_count.fetch_add(1, Ordering::SeqCst);

    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };

    let staged_files = state
        .staging_dir
        .as_ref()
        .and_then(|dir| std::fs::read_dir(dir).ok())
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();

    state.requests.lock().expect("mock state lock").push(RecordedRequest {
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body: body.to_vec(),
        staged_files,
    });

    match &state.behavior {
        Behavior::Transcribe(text) => Json(serde_json::json!({ "text": text })).into_response(),
        Behavior::Echo { delay } => {
            tokio::time::sleep(*delay).await;
            Json(serde_json::json!({ "text": String::from_utf8_lossy(&body) })).into_response()
        }
        Behavior::Fail { status, body } => (*status, body.clone()).into_response(),
        Behavior::Stall(delay) => {
            tokio::time::sleep(*delay).await;
            Json(serde_json::json!({ "text": "too late" })).into_response()
        }
    }
}
