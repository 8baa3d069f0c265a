//! Request builder: one image plus an optional context block becomes one
//! streaming chat completion request.

use base64::Engine as _;
use thiserror::Error;
use tracing::debug;

use vista_types::protocol::{ChatCompletionRequest, ChatMessage, ContentPart, ImageUrl, Role};

use crate::session::UploadedImage;

/// Model every analysis is sent to.
pub const MODEL_ID: &str = "gpt-4o";

/// Completion token budget.
pub const MAX_TOKENS: u32 = 1200;

/// Fixed instruction that opens every prompt.
pub const BASE_PROMPT: &str = "Describe lo que ves en la imagen en español.";

/// Separator and label placed before user-supplied context.
pub const DETAILS_HEADER: &str = "\n\nDetalles adicionales proporcionados:\n";

/// MIME type declared in the data URI. Always JPEG, whatever was uploaded.
pub const DATA_URI_MIME: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("image '{filename}' is empty")]
    EmptyImage { filename: String },
}

/// The "add details" toggle and the text typed under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub show_details: bool,
    pub details: String,
}

impl PromptContext {
    pub fn new(show_details: bool, details: impl Into<String>) -> Self {
        Self { show_details, details: details.into() }
    }
}

/// Base instruction, plus the verbatim context block when the toggle is on
/// and some context was typed.
pub fn build_prompt(context: &PromptContext) -> String {
    let mut prompt = BASE_PROMPT.to_string();
    if context.show_details && !context.details.is_empty() {
        prompt.push_str(DETAILS_HEADER);
        prompt.push_str(&context.details);
    }
    prompt
}

/// Standard padded base64 of the full byte sequence.
pub fn encode_image(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

pub fn image_data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", DATA_URI_MIME, encode_image(bytes))
}

/// Build the outbound request. Pure: no I/O, no mutation of the image.
pub fn build_request(
    image: &UploadedImage,
    context: &PromptContext,
) -> Result<ChatCompletionRequest, BuildError> {
    if image.bytes().is_empty() {
        return Err(BuildError::EmptyImage { filename: image.filename().to_string() });
    }

    let prompt = build_prompt(context);
    debug!(
        "Building request: file={} bytes={} details={}",
        image.filename(),
        image.bytes().len(),
        prompt.len() > BASE_PROMPT.len()
    );

    Ok(ChatCompletionRequest {
        model: MODEL_ID.to_string(),
        messages: vec![ChatMessage {
            role: Role::User,
            content: vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: image_data_uri(image.bytes()) },
                },
            ],
        }],
        max_tokens: MAX_TOKENS,
        stream: true,
    })
}
