// Shared fixtures: a local axum server standing in for the webhook, a
// recording view and a scripted reply source.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use legal_chat_widget::{ChatConfig, ChatView, Message, OutboundPayload, RawResponse, ReplySource, WebhookError};
use serde_json::Value;
use tokio::sync::Notify;

#[derive(Clone, Debug)]
pub enum StubReply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
    Slow(Duration, Value),
}

#[derive(Default)]
pub struct StubState {
    replies: Vec<StubReply>,
    pub hits: AtomicUsize,
    pub bodies: Mutex<Vec<Value>>,
    pub headers: Mutex<Vec<HeaderMap>>,
}

pub struct StubWebhook {
    pub url: String,
    pub state: Arc<StubState>,
}

impl StubWebhook {
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.state.bodies.lock().unwrap().last().cloned()
    }

    pub fn last_headers(&self) -> Option<HeaderMap> {
        self.state.headers.lock().unwrap().last().cloned()
    }
}

/// Serve `replies` in order on `POST /webhook/chat`; the last one repeats.
pub async fn spawn_stub(replies: Vec<StubReply>) -> StubWebhook {
    let state = Arc::new(StubState { replies, ..Default::default() });
    let app = Router::new()
        .route("/webhook/chat", post(handle))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    StubWebhook { url: format!("http://{addr}/webhook/chat"), state }
}

async fn handle(State(state): State<Arc<StubState>>, headers: HeaderMap, body: String) -> Response {
    let index = state.hits.fetch_add(1, Ordering::SeqCst);
    if let Ok(value) = serde_json::from_str::<Value>(&body) {
        state.bodies.lock().unwrap().push(value);
    }
    state.headers.lock().unwrap().push(headers);

    let reply = state.replies[index.min(state.replies.len() - 1)].clone();
    match reply {
        StubReply::Json(status, value) => (status, axum::Json(value)).into_response(),
        StubReply::Text(status, text) => (status, [(header::CONTENT_TYPE, "text/plain")], text).into_response(),
        StubReply::Slow(delay, value) => {
            tokio::time::sleep(delay).await;
            axum::Json(value).into_response()
        }
    }
}

/// An address nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/webhook/chat")
}

pub fn test_config(url: &str) -> ChatConfig {
    ChatConfig {
        webhook_url: url.to_string(),
        timeout: Duration::from_millis(500),
        max_retries: 0,
        retry_delay: Duration::from_millis(10),
        welcome_delay: Duration::from_millis(10),
        ..Default::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Open,
    Close,
    FocusInput,
    Badge(bool),
    Render(String),
    Typing(bool),
    ClearInput,
    HideSuggestions,
    ClearMessages,
}

#[derive(Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
    pub rendered: Vec<Message>,
    pub typing: bool,
}

impl RecordingView {
    pub fn last_rendered(&self) -> Option<&Message> {
        self.rendered.last()
    }
}

impl ChatView for RecordingView {
    fn open(&mut self) {
        self.calls.push(ViewCall::Open);
    }

    fn close(&mut self) {
        self.calls.push(ViewCall::Close);
    }

    fn focus_input(&mut self) {
        self.calls.push(ViewCall::FocusInput);
    }

    fn set_badge(&mut self, visible: bool) {
        self.calls.push(ViewCall::Badge(visible));
    }

    fn render_message(&mut self, message: &Message) {
        self.calls.push(ViewCall::Render(message.content.clone()));
        self.rendered.push(message.clone());
    }

    fn set_typing(&mut self, visible: bool) {
        self.typing = visible;
        self.calls.push(ViewCall::Typing(visible));
    }

    fn clear_input(&mut self) {
        self.calls.push(ViewCall::ClearInput);
    }

    fn hide_suggestions(&mut self) {
        self.calls.push(ViewCall::HideSuggestions);
    }

    fn clear_messages(&mut self) {
        self.rendered.clear();
        self.calls.push(ViewCall::ClearMessages);
    }
}

/// Reply source that answers from a script and records every payload.
/// When gated, each fetch waits for `release()` before answering.
pub struct ScriptedSource {
    script: Mutex<Vec<Result<RawResponse, WebhookError>>>,
    pub payloads: Mutex<Vec<OutboundPayload>>,
    pub calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<RawResponse, WebhookError>>) -> Self {
        Self { script: Mutex::new(script), payloads: Mutex::new(vec![]), calls: AtomicUsize::new(0), gate: None }
    }

    pub fn gated(script: Vec<Result<RawResponse, WebhookError>>) -> Self {
        Self { gate: Some(Notify::new()), ..Self::new(script) }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReplySource for ScriptedSource {
    async fn fetch(&self, payload: &OutboundPayload) -> Result<RawResponse, WebhookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(RawResponse::Null)
        } else {
            script.remove(0)
        }
    }
}
