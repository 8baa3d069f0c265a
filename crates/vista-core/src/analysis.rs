//! One analysis run: build the request, then render the stream.

use tracing::{info, warn};

use vista_types::models::Credential;

use crate::builder::{build_request, PromptContext};
use crate::renderer::{
    failure_message, render_stream, FragmentSource, Frame, Outcome, RenderSink, RenderState,
};
use crate::session::UploadedImage;

/// Inputs captured from a session at the moment the button was pressed.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    pub image: UploadedImage,
    pub credential: Credential,
    pub prompt: PromptContext,
}

pub async fn run_analysis<S, K>(source: &S, input: &AnalysisInput, sink: &mut K) -> Outcome
where
    S: FragmentSource + ?Sized,
    K: RenderSink + ?Sized,
{
    let request = match build_request(&input.image, &input.prompt) {
        Ok(request) => request,
        Err(e) => {
            warn!("Analysis of {} not started: {}", input.image.filename(), e);
            let message = failure_message(&e);
            sink.render(Frame::Failed { message: message.clone() });
            return Outcome {
                state: RenderState::Failed,
                display: message,
                renders: 1,
                fragments: 0,
            };
        },
    };

    info!(
        "🔍 Analyzing {} ({} bytes, {})",
        input.image.filename(),
        input.image.bytes().len(),
        input.image.kind().mime_type()
    );

    let outcome = render_stream(source, &request, &input.credential, sink).await;

    match outcome.state {
        RenderState::Completed => info!(
            "✅ Analysis of {} completed: {} fragments, {} renders",
            input.image.filename(),
            outcome.fragments,
            outcome.renders
        ),
        _ => warn!("❌ Analysis of {} failed: {}", input.image.filename(), outcome.display),
    }

    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::builder::{image_data_uri, BASE_PROMPT, DETAILS_HEADER};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use vista_client::ClientError;
    use vista_types::protocol::{ChatCompletionRequest, StreamChunk};

    use crate::renderer::FragmentStream;

    /// Records the request it was opened with and replays fixed deltas.
    struct RecordingSource {
        deltas: Vec<Option<&'static str>>,
        seen: Mutex<Vec<(ChatCompletionRequest, String)>>,
    }

    impl RecordingSource {
        fn new(deltas: Vec<Option<&'static str>>) -> Self {
            Self { deltas, seen: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl FragmentSource for RecordingSource {
        async fn open(
            &self,
            request: &ChatCompletionRequest,
            credential: &Credential,
        ) -> Result<FragmentStream, ClientError> {
            self.seen.lock().unwrap().push((request.clone(), credential.expose().to_string()));
            let items: Vec<Result<StreamChunk, ClientError>> =
                self.deltas.iter().map(|d| Ok(StreamChunk::from_delta(*d))).collect();
            Ok(Box::pin(futures::stream::iter(items)))
        }
    }

    #[tokio::test]
    async fn test_plain_analysis_scenario() {
        let bytes: Vec<u8> = (0..500u32).map(|i| (i * 13 % 256) as u8).collect();
        let input = AnalysisInput {
            image: UploadedImage::new("playa.png", bytes.clone()).unwrap(),
            credential: Credential::new("sk-test"),
            prompt: PromptContext::new(false, ""),
        };
        let source = RecordingSource::new(vec![Some("Hola"), Some(" mundo"), None, Some("!")]);
        let mut frames = Vec::new();

        let outcome = run_analysis(&source, &input, &mut frames).await;

        assert_eq!(outcome.display, "Hola mundo!");
        assert_eq!(frames.last(), Some(&Frame::Final { text: "Hola mundo!".to_string() }));

        let seen = source.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (request, credential) = &seen[0];
        assert_eq!(credential, "sk-test");
        assert_eq!(request.prompt_text(), Some(BASE_PROMPT));
        assert_eq!(request.image_url(), Some(image_data_uri(&bytes).as_str()));
        assert!(request.image_url().unwrap().starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_details_scenario_with_empty_stream() {
        let input = AnalysisInput {
            image: UploadedImage::new("bosque.jpg", vec![0xff, 0xd8, 0xff]).unwrap(),
            credential: Credential::new("sk-test"),
            prompt: PromptContext::new(true, "tomada en otoño"),
        };
        let source = RecordingSource::new(vec![]);
        let mut frames = Vec::new();

        let outcome = run_analysis(&source, &input, &mut frames).await;

        assert_eq!(outcome.state, RenderState::Completed);
        assert_eq!(outcome.display, "");
        assert_eq!(frames, vec![Frame::Final { text: String::new() }]);

        let seen = source.seen.lock().unwrap();
        let expected = format!("{}{}{}", BASE_PROMPT, DETAILS_HEADER, "tomada en otoño");
        assert_eq!(seen[0].0.prompt_text(), Some(expected.as_str()));
    }
}
