//! Client for OpenAI-compatible chat completion streams.
//!
//! [`VisionClient::chat_stream`] posts one request and hands back the
//! response as a lazy, finite stream of [`vista_types::StreamChunk`]s.
//! There is no retry layer: the first failure is returned to the caller.

mod client;
mod error;
mod sse;

pub use client::{ChunkStream, VisionClient};
pub use error::ClientError;
pub use sse::parse_chunk_stream;
