use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::AnalysisService;
use crate::datauri::EncodedAsset;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct StructuredRequest<'a> {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: AnalysisGenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisGenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a serde_json::Value,
}

/// Structured (JSON-mode) analysis against a multimodal Gemini model.
pub struct GeminiAnalysisClient {
    http: GeminiHttpClient,
}

impl GeminiAnalysisClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }
}

super::impl_with_gemini_base_url!(GeminiAnalysisClient);

#[async_trait]
impl AnalysisService for GeminiAnalysisClient {
    async fn generate_json(
        &self,
        prompt: &str,
        media: &[EncodedAsset],
        response_schema: &serde_json::Value,
    ) -> Result<String> {
        tracing::debug!(
            "Requesting structured analysis from {} ({} media part(s))",
            self.http.model(),
            media.len()
        );

        let request = StructuredRequest {
            contents: vec![Content::user_with_media(prompt, media)],
            generation_config: AnalysisGenerationConfig {
                response_mime_type: "application/json",
                response_schema,
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response.first_text().ok_or_else(|| {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            Error::ModelResponseInvalid(format!(
                "Gemini returned no analysis text (finish reason: {})",
                reason
            ))
        })
    }
}
