//! Protocol definitions for the remote inference API.
//!
//! Only the OpenAI ChatCompletions shape is spoken: one multimodal request
//! out, a stream of `chat.completion.chunk` objects back.

pub mod openai;

pub use openai::{
    ApiErrorBody, ApiErrorDetail, ChatCompletionRequest, ChatMessage, ChunkChoice, ChunkDelta,
    ContentPart, ImageUrl, Role, StreamChunk,
};
