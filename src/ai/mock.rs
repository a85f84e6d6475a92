use super::{
    AnalysisService, ImageGenerationService, VideoGenerationRequest, VideoGenerationService,
};
use crate::datauri::EncodedAsset;
use crate::operation::{AssetReference, GenerationOperation};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A failure a mock should produce. `Error` itself is not `Clone`, so mocks
/// keep a recipe and build a fresh error per call.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Provider(String),
    Transient,
}

impl MockFailure {
    fn to_error(&self) -> Error {
        match self {
            MockFailure::Provider(msg) => Error::AiProvider(msg.clone()),
            MockFailure::Transient => Error::TransientUnavailable("mock returned 503".to_string()),
        }
    }
}

/// Canned JSON answers for [`AnalysisService`], cycled in order.
#[derive(Clone)]
pub struct MockAnalysisClient {
    responses: Arc<Mutex<Vec<String>>>,
    failure: Option<MockFailure>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockAnalysisClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            failure: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, json: impl Into<String>) -> Self {
        self.responses.lock().unwrap().push(json.into());
        self
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockAnalysisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnalysisService for MockAnalysisClient {
    async fn generate_json(
        &self,
        prompt: &str,
        _media: &[EncodedAsset],
        _response_schema: &serde_json::Value,
    ) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        if let Some(failure) = &self.failure {
            return Err(failure.to_error());
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(Error::ModelResponseInvalid(
                "mock has no canned response".to_string(),
            ))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

/// Heatmap stand-in for [`ImageGenerationService`].
#[derive(Clone)]
pub struct MockImageGenerationClient {
    image: Option<EncodedAsset>,
    failure: Option<MockFailure>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageGenerationClient {
    /// Defaults to returning a tiny PNG.
    pub fn new() -> Self {
        Self {
            image: Some(EncodedAsset::new(
                "image/png",
                vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A],
            )),
            failure: None,
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image(mut self, image: Option<EncodedAsset>) -> Self {
        self.image = image;
        self
    }

    pub fn with_failure(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(
        &self,
        _prompt: &str,
        _media: &[EncodedAsset],
    ) -> Result<Option<EncodedAsset>> {
        *self.call_count.lock().unwrap() += 1;

        match &self.failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(self.image.clone()),
        }
    }
}

/// Scripted long-running operation provider.
///
/// `check_operation` walks through the scripted states and keeps returning
/// the last one once the script is exhausted.
#[derive(Clone)]
pub struct MockVideoGenerationClient {
    start_response: GenerationOperation,
    start_failures: Arc<Mutex<Vec<MockFailure>>>,
    check_responses: Arc<Mutex<Vec<GenerationOperation>>>,
    start_count: Arc<Mutex<usize>>,
    check_count: Arc<Mutex<usize>>,
}

impl MockVideoGenerationClient {
    pub fn new() -> Self {
        Self {
            start_response: GenerationOperation::pending("operations/mock"),
            start_failures: Arc::new(Mutex::new(Vec::new())),
            check_responses: Arc::new(Mutex::new(Vec::new())),
            start_count: Arc::new(Mutex::new(0)),
            check_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_start_response(mut self, operation: GenerationOperation) -> Self {
        self.start_response = operation;
        self
    }

    /// Fail the next `start_generation` call; queue several for repeated failures.
    pub fn with_start_failure(self, failure: MockFailure) -> Self {
        self.start_failures.lock().unwrap().push(failure);
        self
    }

    pub fn with_check_responses(self, responses: Vec<GenerationOperation>) -> Self {
        *self.check_responses.lock().unwrap() = responses;
        self
    }

    pub fn start_count(&self) -> usize {
        *self.start_count.lock().unwrap()
    }

    pub fn check_count(&self) -> usize {
        *self.check_count.lock().unwrap()
    }
}

impl Default for MockVideoGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoGenerationService for MockVideoGenerationClient {
    async fn start_generation(
        &self,
        _request: &VideoGenerationRequest,
    ) -> Result<GenerationOperation> {
        *self.start_count.lock().unwrap() += 1;

        let mut failures = self.start_failures.lock().unwrap();
        if !failures.is_empty() {
            return Err(failures.remove(0).to_error());
        }
        Ok(self.start_response.clone())
    }

    async fn check_operation(
        &self,
        operation: &GenerationOperation,
    ) -> Result<GenerationOperation> {
        let mut count = self.check_count.lock().unwrap();
        *count += 1;

        let responses = self.check_responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(GenerationOperation::succeeded(
                operation.handle.clone(),
                Some(AssetReference {
                    url: "https://mock.invalid/video.mp4".to_string(),
                    content_type: Some("video/mp4".to_string()),
                }),
            ));
        }
        let index = (*count - 1).min(responses.len() - 1);
        Ok(responses[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_analysis_cycles_responses() {
        let client = MockAnalysisClient::new()
            .with_response("{\"n\":1}")
            .with_response("{\"n\":2}");
        let schema = serde_json::json!({});

        assert_eq!(
            client.generate_json("a", &[], &schema).await.unwrap(),
            "{\"n\":1}"
        );
        assert_eq!(
            client.generate_json("b", &[], &schema).await.unwrap(),
            "{\"n\":2}"
        );
        assert_eq!(
            client.generate_json("c", &[], &schema).await.unwrap(),
            "{\"n\":1}"
        );
        assert_eq!(client.get_call_count(), 3);
        assert_eq!(client.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_image_failure() {
        let client = MockImageGenerationClient::new().with_failure(MockFailure::Transient);
        let err = client.generate_image("p", &[]).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_video_repeats_last_state() {
        let client = MockVideoGenerationClient::new()
            .with_check_responses(vec![GenerationOperation::pending("op")]);
        let op = GenerationOperation::pending("op");

        for _ in 0..3 {
            assert!(!client.check_operation(&op).await.unwrap().done);
        }
        assert_eq!(client.check_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_video_start_failures_are_consumed() {
        let client = MockVideoGenerationClient::new().with_start_failure(MockFailure::Transient);
        let request = VideoGenerationRequest::new("script");

        assert!(client.start_generation(&request).await.is_err());
        assert!(client.start_generation(&request).await.is_ok());
        assert_eq!(client.start_count(), 2);
    }
}
