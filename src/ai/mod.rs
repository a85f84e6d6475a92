//! AI service integration for media analysis and generation
//!
//! Each capability the flows depend on is a trait so the flows, the fan-out,
//! and the operation poller can run against substitute clients in tests.

pub mod gemini;
pub mod mock;

pub use gemini::{GeminiAnalysisClient, GeminiImageClient, GeminiVideoClient};
pub use mock::{MockAnalysisClient, MockImageGenerationClient, MockVideoGenerationClient};

use crate::datauri::EncodedAsset;
use crate::operation::GenerationOperation;
use crate::Result;
use async_trait::async_trait;

/// Synchronous structured generation: prompt + media in, JSON text out.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Returns the model's JSON answer, constrained to `response_schema`.
    async fn generate_json(
        &self,
        prompt: &str,
        media: &[EncodedAsset],
        response_schema: &serde_json::Value,
    ) -> Result<String>;
}

/// Image generation from a prompt plus reference media.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// `Ok(None)` when the model answered without producing an image.
    async fn generate_image(
        &self,
        prompt: &str,
        media: &[EncodedAsset],
    ) -> Result<Option<EncodedAsset>>;
}

/// Parameters for a long-running video generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoGenerationRequest {
    pub prompt: String,
    pub duration_seconds: u32,
    pub aspect_ratio: String,
}

impl VideoGenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            duration_seconds: 8,
            aspect_ratio: "16:9".to_string(),
        }
    }
}

/// Long-running generation: start a job, then check it by handle.
#[async_trait]
pub trait VideoGenerationService: Send + Sync {
    async fn start_generation(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<GenerationOperation>;

    async fn check_operation(
        &self,
        operation: &GenerationOperation,
    ) -> Result<GenerationOperation>;
}
