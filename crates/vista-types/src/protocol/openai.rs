//! OpenAI ChatCompletions API types.

use serde::{Deserialize, Serialize};

/// OpenAI message role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Reference to an image, either remote or an inline data URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageUrl {
    pub url: String,
}

/// One part of a multimodal message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum ContentPart {
    /// Plain text content.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Image reference.
    #[serde(rename = "image_url")]
    ImageUrl {
        /// URL or data URI of the image.
        image_url: ImageUrl,
    },
}

/// A chat message carrying multimodal content parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

/// Request body for the chat completions endpoint.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Request an SSE stream of chunks.
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Text of the first text part of the first message.
    pub fn prompt_text(&self) -> Option<&str> {
        self.messages.first()?.content.iter().find_map(|part| match part {
            ContentPart::Text { text } => Some(text.as_str()),
            ContentPart::ImageUrl { .. } => None,
        })
    }

    /// URL of the first image part of the first message.
    pub fn image_url(&self) -> Option<&str> {
        self.messages.first()?.content.iter().find_map(|part| match part {
            ContentPart::ImageUrl { image_url } => Some(image_url.url.as_str()),
            ContentPart::Text { .. } => None,
        })
    }
}

/// Incremental content delta for streaming responses.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ChunkDelta {
    /// Role of the message author (first chunk only).
    #[serde(default)]
    pub role: Option<Role>,
    /// Incremental text content.
    #[serde(default)]
    pub content: Option<String>,
}

/// A single choice inside a stream chunk.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ChunkChoice {
    /// Index of this choice in the list.
    #[serde(default)]
    pub index: u32,
    /// Incremental content.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Reason generation stopped ("stop", "length", etc.).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// A single SSE chunk in a streaming response.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct StreamChunk {
    /// Unique response identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Model that generated the response.
    #[serde(default)]
    pub model: Option<String>,
    /// Generated completion choices.
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl StreamChunk {
    /// Incremental text of the first choice, if any.
    ///
    /// Chunks without choices (usage trailers, keep-alives) carry no text.
    pub fn text_delta(&self) -> Option<&str> {
        self.choices.first()?.delta.content.as_deref()
    }

    /// Build a chunk holding a single text delta. Handy for scripted sources.
    pub fn from_delta(content: Option<&str>) -> Self {
        Self {
            id: None,
            model: None,
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta { role: None, content: content.map(str::to_string) },
                finish_reason: None,
            }],
        }
    }
}

/// Error envelope returned by the API on failure.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

/// Error details inside [`ApiErrorBody`].
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<serde_json::Value>,
}
