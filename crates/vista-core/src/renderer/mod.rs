//! Streaming response renderer.
//!
//! Pulls chunks from a [`FragmentSource`] and pushes a [`Frame`] to a
//! [`RenderSink`] after every text delta, then exactly one terminal frame.
//!
//! ```text
//!   Idle ──open──► Streaming ──end──► Completed
//!     │               │
//!     └──error────────┴──error──► Failed
//! ```
//!
//! Frames replace each other: a sink shows only the latest one. Streaming
//! frames carry the accumulated text plus [`CURSOR`]; the cursor never
//! enters the accumulator.

mod source;

pub use source::{FragmentSource, FragmentStream};

use futures::StreamExt;
use serde::Serialize;
use std::fmt::Display;
use tracing::debug;

use vista_types::models::Credential;
use vista_types::protocol::ChatCompletionRequest;

/// Glyph appended to in-progress renders.
pub const CURSOR: char = '▌';

/// Prefix of the single message shown when an analysis fails.
pub const FAILURE_PREFIX: &str = "❌ Ha ocurrido un error: ";

pub fn failure_message(err: &impl Display) -> String {
    format!("{}{}", FAILURE_PREFIX, err)
}

/// One observable render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Frame {
    /// Accumulated text followed by the cursor glyph.
    Partial { text: String },
    /// Final text, no cursor.
    Final { text: String },
    /// Error message replacing any partial text.
    Failed { message: String },
}

/// Destination of render frames.
pub trait RenderSink: Send {
    fn render(&mut self, frame: Frame);
}

impl RenderSink for Vec<Frame> {
    fn render(&mut self, frame: Frame) {
        self.push(frame);
    }
}

/// Append-only text buffer for one request.
#[derive(Debug, Default)]
pub struct Accumulator {
    text: String,
}

impl Accumulator {
    pub fn push(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    pub fn with_cursor(&self) -> String {
        let mut view = String::with_capacity(self.text.len() + CURSOR.len_utf8());
        view.push_str(&self.text);
        view.push(CURSOR);
        view
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderState {
    Idle,
    Streaming,
    Completed,
    Failed,
}

/// How a render run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// `Completed` or `Failed`.
    pub state: RenderState,
    /// Content of the terminal frame.
    pub display: String,
    /// Frames pushed, terminal frame included.
    pub renders: usize,
    /// Chunks pulled from the stream, with or without text.
    pub fragments: usize,
}

struct Renderer<'a, K: RenderSink + ?Sized> {
    sink: &'a mut K,
    accumulator: Accumulator,
    state: RenderState,
    renders: usize,
    fragments: usize,
}

impl<'a, K: RenderSink + ?Sized> Renderer<'a, K> {
    fn new(sink: &'a mut K) -> Self {
        Self {
            sink,
            accumulator: Accumulator::default(),
            state: RenderState::Idle,
            renders: 0,
            fragments: 0,
        }
    }

    fn emit(&mut self, frame: Frame) {
        self.renders += 1;
        self.sink.render(frame);
    }

    fn on_fragment(&mut self, delta: Option<&str>) {
        self.fragments += 1;
        if let Some(text) = delta {
            self.accumulator.push(text);
            let view = self.accumulator.with_cursor();
            self.emit(Frame::Partial { text: view });
        }
    }

    fn complete(mut self) -> Outcome {
        self.state = RenderState::Completed;
        let text = std::mem::take(&mut self.accumulator).into_string();
        self.emit(Frame::Final { text: text.clone() });
        debug!("Render completed: {} fragments, {} chars", self.fragments, text.chars().count());
        self.finish(text)
    }

    fn fail(mut self, err: &impl Display) -> Outcome {
        self.state = RenderState::Failed;
        // Partial text is dropped here and never rendered again.
        self.accumulator = Accumulator::default();
        let message = failure_message(err);
        self.emit(Frame::Failed { message: message.clone() });
        debug!("Render failed after {} fragments: {}", self.fragments, err);
        self.finish(message)
    }

    fn finish(self, display: String) -> Outcome {
        Outcome { state: self.state, display, renders: self.renders, fragments: self.fragments }
    }
}

/// Open the stream and render it to completion or failure.
///
/// Runs until the source ends or errors; there is no cancellation.
pub async fn render_stream<S, K>(
    source: &S,
    request: &ChatCompletionRequest,
    credential: &Credential,
    sink: &mut K,
) -> Outcome
where
    S: FragmentSource + ?Sized,
    K: RenderSink + ?Sized,
{
    let mut renderer = Renderer::new(sink);

    let mut stream = match source.open(request, credential).await {
        Ok(stream) => stream,
        Err(e) => return renderer.fail(&e),
    };
    renderer.state = RenderState::Streaming;

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => renderer.on_fragment(chunk.text_delta()),
            Err(e) => return renderer.fail(&e),
        }
    }

    renderer.complete()
}
