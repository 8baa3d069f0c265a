//! Streaming analysis endpoint.
//!
//! The response is `text/event-stream`. Each event carries one JSON object:
//! `warning` events first, then `render` events whose payload is a
//! [`Frame`]. The page replaces its output with every render it receives.

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::debug;

use vista_core::renderer::{Frame, RenderSink};
use vista_core::run_analysis;

use super::form::parse_form;
use super::session::{resolve_session, with_session_cookie, WarningView};
use crate::state::AppState;

pub fn sse_event(event: &str, data: &impl serde::Serialize) -> Bytes {
    let json = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    Bytes::from(format!("event: {}\ndata: {}\n\n", event, json))
}

/// Forwards frames to the HTTP response.
///
/// A closed receiver means the page went away; the analysis still runs to
/// its terminal state and remaining frames are dropped.
struct ChannelSink {
    tx: mpsc::UnboundedSender<Bytes>,
    detached: bool,
}

impl RenderSink for ChannelSink {
    fn render(&mut self, frame: Frame) {
        if self.tx.send(sse_event("render", &frame)).is_err() && !self.detached {
            self.detached = true;
            debug!("Client disconnected, finishing analysis without display");
        }
    }
}

pub async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, (StatusCode, String)> {
    let (id, created) = resolve_session(&state, &headers);
    let form = parse_form(multipart).await?;

    let submission = state.sessions().submit(id, form.update, true);

    let (tx, rx) = mpsc::unbounded_channel::<Bytes>();
    for warning in form.warnings.into_iter().chain(submission.warnings) {
        let _ = tx.send(sse_event("warning", &WarningView::from(warning)));
    }

    if let Some((input, guard)) = submission.ready {
        let source = state.source();
        tokio::spawn(async move {
            let _guard = guard;
            let mut sink = ChannelSink { tx, detached: false };
            run_analysis(source.as_ref(), &input, &mut sink).await;
        });
    } else {
        drop(tx);
    }

    let body = Body::from_stream(UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>));
    let response = (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response();

    Ok(with_session_cookie(response, id, created))
}
