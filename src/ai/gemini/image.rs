use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::ImageGenerationService;
use crate::datauri::EncodedAsset;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct ImageRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: ImageGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageGenerationConfig {
    response_modalities: Vec<String>,
}

/// Image-output Gemini model, used for manipulation heatmaps.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
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

super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(
        &self,
        prompt: &str,
        media: &[EncodedAsset],
    ) -> Result<Option<EncodedAsset>> {
        let request = ImageRequest {
            contents: vec![Content::user_with_media(prompt, media)],
            generation_config: ImageGenerationConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        };

        let gemini_response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let Some(image_data) = gemini_response.first_inline_data() else {
            tracing::debug!("Gemini image response contained no inline image");
            return Ok(None);
        };

        tracing::debug!(
            "Gemini returned image with mime_type: {}",
            image_data.mime_type
        );

        use base64::Engine as _;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(&image_data.data)
            .map_err(|e| {
                Error::ModelResponseInvalid(format!("Failed to decode Gemini base64 image: {}", e))
            })?;

        Ok(Some(EncodedAsset::new(image_data.mime_type.clone(), bytes)))
    }
}
