use crate::{Error, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client used by the analysis/image/video modules.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    api_key: String,
    model: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a Gemini client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`),
    /// not a `models/...`-prefixed path segment.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send<Resp: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Resp> {
        let response = request
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            if status == StatusCode::SERVICE_UNAVAILABLE {
                return Err(Error::TransientUnavailable(format!(
                    "Gemini returned status {}",
                    status
                )));
            }
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        self.send(
            self.client
                .post(&url)
                .header("Content-Type", "application/json")
                .json(request),
        )
        .await
    }

    /// Calls Gemini's `generateContent` endpoint for analysis/heatmap requests.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        self.post_to_url(url, request).await
    }

    /// Calls `predictLongRunning`, which answers with an operation resource.
    pub async fn predict_long_running<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:predictLongRunning",
            self.base_url, self.model
        );
        self.post_to_url(url, request).await
    }

    /// Fetches the current state of a long-running operation by name.
    pub async fn get_operation<Resp: DeserializeOwned>(&self, name: &str) -> Result<Resp> {
        let url = format!("{}/v1beta/{}", self.base_url, name.trim_start_matches('/'));
        self.send(self.client.get(&url)).await
    }
}
