//! Test helpers for vista-server unit tests.

use async_trait::async_trait;
use axum::http::{header, HeaderName, HeaderValue};
use axum_test::TestServer;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vista_client::ClientError;
use vista_core::renderer::{FragmentSource, FragmentStream};
use vista_types::models::{Credential, ServerConfig};
use vista_types::protocol::{ChatCompletionRequest, StreamChunk};

use crate::api::session::SESSION_COOKIE;
use crate::router::build_router;
use crate::state::AppState;

#[derive(Clone, Copy, Debug)]
pub enum Step {
    Text(&'static str),
    Empty,
    Fail(&'static str),
}

/// Replays a fixed script and counts how often it was opened.
pub struct ScriptedSource {
    steps: Vec<Step>,
    opened: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps, opened: AtomicUsize::new(0) }
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FragmentSource for ScriptedSource {
    async fn open(
        &self,
        _request: &ChatCompletionRequest,
        _credential: &Credential,
    ) -> Result<FragmentStream, ClientError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let items: Vec<Result<StreamChunk, ClientError>> = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Text(t) => Ok(StreamChunk::from_delta(Some(*t))),
                Step::Empty => Ok(StreamChunk::from_delta(None)),
                Step::Fail(m) => Err(ClientError::Stream((*m).to_string())),
            })
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

/// `AppState` backed by the given source and default config.
pub fn test_app_state(source: Arc<dyn FragmentSource>) -> AppState {
    AppState::new_with_components(ServerConfig::default(), source)
}

pub fn test_server(state: AppState) -> TestServer {
    TestServer::new(build_router(state)).expect("failed to start test server")
}

/// Server plus a handle on the scripted source, to count opened streams.
pub fn scripted_server(steps: Vec<Step>) -> (TestServer, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource::new(steps));
    let server = test_server(test_app_state(source.clone()));
    (server, source)
}

/// Session id from a `Set-Cookie` header.
pub fn session_from_set_cookie(value: &HeaderValue) -> String {
    let raw = value.to_str().expect("ascii cookie");
    let pair = raw.split(';').next().expect("cookie pair");
    let (name, id) = pair.split_once('=').expect("name=value");
    assert_eq!(name, SESSION_COOKIE);
    id.to_string()
}

pub fn cookie_header(session: &str) -> (HeaderName, HeaderValue) {
    let value = HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, session))
        .expect("valid cookie header");
    (header::COOKIE, value)
}

/// Split an event-stream body into `(event, data)` pairs.
pub fn parse_events(body: &str) -> Vec<(String, serde_json::Value)> {
    body.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(|block| {
            let mut event = String::new();
            let mut data = String::new();
            for line in block.lines() {
                if let Some(rest) = line.strip_prefix("event: ") {
                    event = rest.to_string();
                } else if let Some(rest) = line.strip_prefix("data: ") {
                    data.push_str(rest);
                }
            }
            (event, serde_json::from_str(&data).expect("event data is JSON"))
        })
        .collect()
}
