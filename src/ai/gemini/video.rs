//! Veo video generation through Gemini's long-running operation API.

use super::client::GeminiHttpClient;
use super::types::{Operation, PredictLongRunningRequest, VideoInstance, VideoParameters};
use crate::ai::{VideoGenerationRequest, VideoGenerationService};
use crate::operation::{AssetReference, GenerationOperation};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

pub struct GeminiVideoClient {
    http: GeminiHttpClient,
}

impl GeminiVideoClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }
}

super::impl_with_gemini_base_url!(GeminiVideoClient);

impl From<Operation> for GenerationOperation {
    fn from(op: Operation) -> Self {
        if let Some(status) = op.error {
            let message = match status.code {
                Some(code) => format!("{} (code {})", status.message, code),
                None => status.message,
            };
            return GenerationOperation::failed(op.name, message);
        }

        if !op.done {
            return GenerationOperation::pending(op.name);
        }

        let video_response = op.response.and_then(|r| r.generate_video_response);
        if let Some(response) = &video_response {
            if !response.rai_media_filtered_reasons.is_empty() {
                tracing::warn!(
                    "Operation {} filtered generated media: {}",
                    op.name,
                    response.rai_media_filtered_reasons.join("; ")
                );
            }
        }

        let output = video_response.and_then(|response| {
            response
                .generated_samples
                .into_iter()
                .filter_map(|sample| sample.video)
                .find_map(|video| {
                    video.uri.map(|url| AssetReference {
                        url,
                        content_type: video.mime_type,
                    })
                })
        });

        GenerationOperation::succeeded(op.name, output)
    }
}

#[async_trait]
impl VideoGenerationService for GeminiVideoClient {
    async fn start_generation(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<GenerationOperation> {
        tracing::info!(
            "Starting video generation on {} ({}s, {})",
            self.http.model(),
            request.duration_seconds,
            request.aspect_ratio
        );

        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.clone(),
                duration_seconds: request.duration_seconds,
            },
        };

        let operation: Operation = self.http.predict_long_running(&body).await?;
        tracing::debug!("Video generation operation started: {}", operation.name);
        Ok(operation.into())
    }

    async fn check_operation(
        &self,
        operation: &GenerationOperation,
    ) -> Result<GenerationOperation> {
        let current: Operation = self.http.get_operation(&operation.handle).await?;
        Ok(current.into())
    }
}
