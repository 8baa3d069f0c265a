use async_trait::async_trait;

use vista_client::{ChunkStream, ClientError, VisionClient};
use vista_types::models::Credential;
use vista_types::protocol::ChatCompletionRequest;

/// Lazy, finite, non-restartable sequence of completion chunks.
pub type FragmentStream = ChunkStream;

/// Anything that can open a completion stream for a request.
#[async_trait]
pub trait FragmentSource: Send + Sync {
    async fn open(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<FragmentStream, ClientError>;
}

#[async_trait]
impl FragmentSource for VisionClient {
    async fn open(
        &self,
        request: &ChatCompletionRequest,
        credential: &Credential,
    ) -> Result<FragmentStream, ClientError> {
        self.chat_stream(request, credential).await
    }
}
