//! Test utilities for rvm-client
//!
//! Provides a JSON stand-in codec and an in-process scripted backend so the
//! whole codec -> transport -> codec pipeline can be exercised without the
//! production wire codecs or a real backend.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use rvm_core::{CodecError, Message, MessageCoder, ProtocolVersion};

use crate::client::CoderSet;
use crate::config::ClientConfig;

/// Stand-in codec that serializes the logical message as JSON.
///
/// The production wire codecs are external; this one lets tests observe the
/// exact logical message the dispatcher produced.
#[derive(Debug, Clone, Copy)]
pub struct JsonCoder(pub ProtocolVersion);

impl MessageCoder for JsonCoder {
    fn protocol(&self) -> ProtocolVersion {
        self.0
    }

    fn encode_request(&self, message: &Message) -> Result<String, CodecError> {
        serde_json::to_string(message).map_err(|e| CodecError::Encode(e.to_string()))
    }

    fn decode_response(&self, payload: &str, message: &mut Message) -> Result<(), CodecError> {
        *message = serde_json::from_str(payload).map_err(|e| CodecError::Decode(e.to_string()))?;
        Ok(())
    }
}

/// A full coder set backed by [`JsonCoder`]
pub fn json_coders() -> CoderSet {
    CoderSet {
        v11: Arc::new(JsonCoder(ProtocolVersion::V11)),
        v21: Arc::new(JsonCoder(ProtocolVersion::V21)),
        v30: Arc::new(JsonCoder(ProtocolVersion::V30)),
    }
}

/// Client configuration pointed at a test server, with a zero retry delay so
/// tests do not wait on the wall clock
pub fn test_config(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::new(base_url, "abc", "secret");
    config.retry.delay_ms = 0;
    config
}

/// One request observed by the scripted server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub payload: String,
}

impl RecordedRequest {
    /// Parse the recorded payload back into the logical message
    pub fn message(&self) -> Message {
        serde_json::from_str(&self.payload).expect("recorded payload is not a JSON message")
    }
}

#[derive(Default)]
struct ScriptState {
    responses: VecDeque<String>,
    requests: Vec<RecordedRequest>,
    telemetry_queries: Vec<String>,
}

type Shared = Arc<Mutex<ScriptState>>;

/// In-process backend that replays a scripted queue of response payloads and
/// records every request it sees. Shuts down when dropped.
pub struct ScriptedServer {
    pub addr: SocketAddr,
    state: Shared,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl ScriptedServer {
    pub async fn start() -> std::io::Result<Self> {
        let state: Shared = Arc::new(Mutex::new(ScriptState::default()));

        let router = Router::new()
            .route("/TAP.Web/ota.mp", post(serve_mp))
            .route("/TAP.Web/ota.mpv21", post(serve_mpv21))
            .route("/TAP.Web/ota.mpv30", post(serve_mpv30))
            .route("/1/tlm/send", get(serve_telemetry))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        Ok(Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Endpoint for the telemetry forwarder
    pub fn telemetry_endpoint(&self) -> String {
        format!("{}/1/tlm/send", self.base_url())
    }

    /// Queue the next response payload, encoded from a logical message
    pub fn enqueue_message(&self, message: &Message) {
        let payload = serde_json::to_string(message).expect("message serializes");
        self.enqueue_raw(payload);
    }

    /// Queue the next raw response payload
    pub fn enqueue_raw(&self, payload: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(payload.into());
    }

    /// Requests observed so far, in order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Raw query strings of telemetry uploads observed so far
    pub fn telemetry_queries(&self) -> Vec<String> {
        self.state.lock().unwrap().telemetry_queries.clone()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

fn next_response(state: &Shared, path: &str, payload: String) -> (StatusCode, String) {
    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        path: path.to_string(),
        payload,
    });
    match state.responses.pop_front() {
        Some(response) => (StatusCode::OK, response),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "script exhausted".to_string(),
        ),
    }
}

async fn serve_mp(State(state): State<Shared>, body: String) -> (StatusCode, String) {
    next_response(&state, "/TAP.Web/ota.mp", body)
}

async fn serve_mpv21(State(state): State<Shared>, body: String) -> (StatusCode, String) {
    next_response(&state, "/TAP.Web/ota.mpv21", body)
}

async fn serve_mpv30(State(state): State<Shared>, body: String) -> (StatusCode, String) {
    next_response(&state, "/TAP.Web/ota.mpv30", body)
}

async fn serve_telemetry(
    State(state): State<Shared>,
    RawQuery(query): RawQuery,
) -> (StatusCode, String) {
    state
        .lock()
        .unwrap()
        .telemetry_queries
        .push(query.unwrap_or_default());
    (StatusCode::OK, r#"{"status":"ok"}"#.to_string())
}
