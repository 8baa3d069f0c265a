use crate::error::ClientError;
use crate::sse::parse_chunk_stream;
use futures::Stream;
use reqwest::Client;
use std::pin::Pin;
use std::time::Duration;

use vista_types::models::{Credential, UpstreamConfig};
use vista_types::protocol::{ApiErrorBody, ChatCompletionRequest, StreamChunk};

/// Boxed stream of parsed chunks, as returned by [`VisionClient::chat_stream`].
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ClientError>> + Send>>;

#[derive(Clone)]
pub struct VisionClient {
    client: Client,
    config: UpstreamConfig,
}

impl VisionClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, ClientError> {
        // Only connecting is bounded; a description may stream for minutes.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Post one streaming completion request.
    ///
    /// Errors before the first byte of the body (connection, auth, quota)
    /// are returned here; later failures arrive as items of the stream.
    pub async fn chat_stream(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<ChunkStream, ClientError> {
        let url = self.config.chat_completions_url();
        tracing::debug!("Opening completion stream: model={} url={}", request.model, url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = resp.status();

        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok());
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::from_status(
                status.as_u16(),
                error_message(&body, status.canonical_reason()),
                retry_after,
            ));
        }

        Ok(Box::pin(parse_chunk_stream(resp.bytes_stream())))
    }
}

/// Prefer the API's `error.message`; fall back to the raw body, then the
/// status reason.
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("no response body").to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error":{"message":"Bad key: sk-test.","type":"invalid_request_error"}}"#;
        assert_eq!(error_message(body, Some("Unauthorized")), "Bad key: sk-test.");
        assert_eq!(error_message("upstream exploded", None), "upstream exploded");
        assert_eq!(error_message("", Some("Bad Gateway")), "Bad Gateway");
    }
}
