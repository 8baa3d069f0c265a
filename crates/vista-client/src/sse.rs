use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use std::fmt::Display;
use tracing::debug;

use vista_types::protocol::{ApiErrorBody, StreamChunk};

use crate::error::ClientError;

/// Turn a raw SSE byte stream into parsed completion chunks.
///
/// Network reads may split or merge events arbitrarily, so bytes are
/// buffered and only complete lines are parsed. The stream ends at
/// `data: [DONE]`, at end of body, or after the first error.
pub fn parse_chunk_stream<S, E>(
    byte_stream: S,
) -> impl Stream<Item = Result<StreamChunk, ClientError>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Display,
{
    async_stream::stream! {
        let mut byte_stream = std::pin::pin!(byte_stream);
        let mut buffer = BytesMut::new();

        'read: loop {
            match byte_stream.next().await {
                Some(Ok(bytes)) => {
                    debug!("[SSE] Received chunk: {} bytes", bytes.len());
                    buffer.extend_from_slice(&bytes);

                    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                        let line_raw = buffer.split_to(pos + 1);
                        match parse_line(&line_raw) {
                            LineOutcome::Skip => continue,
                            LineOutcome::Done => break 'read,
                            LineOutcome::Chunk(chunk) => yield Ok(chunk),
                            LineOutcome::Error(e) => {
                                yield Err(e);
                                break 'read;
                            }
                        }
                    }
                }
                Some(Err(e)) => {
                    yield Err(ClientError::Stream(e.to_string()));
                    break 'read;
                }
                None => {
                    // Body ended without a trailing newline on the last event.
                    if !buffer.is_empty() {
                        match parse_line(&buffer) {
                            LineOutcome::Chunk(chunk) => yield Ok(chunk),
                            LineOutcome::Error(e) => yield Err(e),
                            LineOutcome::Skip | LineOutcome::Done => {}
                        }
                    }
                    break 'read;
                }
            }
        }
    }
}

enum LineOutcome {
    Skip,
    Done,
    Chunk(StreamChunk),
    Error(ClientError),
}

fn parse_line(raw: &[u8]) -> LineOutcome {
    let line = match std::str::from_utf8(raw) {
        Ok(s) => s.trim(),
        Err(e) => return LineOutcome::Error(ClientError::Stream(format!("invalid UTF-8: {}", e))),
    };

    // Blank separators, `:` comments, `event:`/`id:` fields carry nothing we use.
    let Some(data) = line.strip_prefix("data:") else {
        return LineOutcome::Skip;
    };
    let data = data.trim();
    if data.is_empty() {
        return LineOutcome::Skip;
    }
    if data == "[DONE]" {
        return LineOutcome::Done;
    }

    let value: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            return LineOutcome::Error(ClientError::InvalidResponse(format!(
                "JSON parse error: {}",
                e
            )))
        }
    };

    if value.get("error").is_some() {
        let message = serde_json::from_value::<ApiErrorBody>(value.clone())
            .map(|body| body.error.message)
            .unwrap_or_else(|_| value["error"].to_string());
        return LineOutcome::Error(ClientError::Upstream(message));
    }

    match serde_json::from_value::<StreamChunk>(value) {
        Ok(chunk) => LineOutcome::Chunk(chunk),
        Err(e) => LineOutcome::Error(ClientError::InvalidResponse(format!(
            "unexpected chunk shape: {}",
            e
        ))),
    }
}
