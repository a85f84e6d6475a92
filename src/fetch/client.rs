use super::{AssetFetcher, DEFAULT_ASSET_MIME};
use crate::datauri::{is_valid_mime, EncodedAsset};
use crate::mime::detect_mime_or;
use crate::operation::AssetReference;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

/// Upper bound on a downloaded asset unless configured otherwise.
pub const DEFAULT_MAX_ASSET_BYTES: usize = 64 * 1024 * 1024;

pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_secs(120);

/// Downloads provider-hosted assets, authenticating with a request header.
pub struct HttpAssetFetcher {
    client: Client,
    api_key: String,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpAssetFetcher {
    pub fn new(api_key: String) -> Self {
        Self::new_with_client(api_key, Client::new())
    }

    pub fn new_with_client(api_key: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            timeout: DEFAULT_ASSET_TIMEOUT,
            max_bytes: DEFAULT_MAX_ASSET_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolve_mime(asset: &AssetReference, header: Option<String>, bytes: &[u8]) -> String {
        asset
            .content_type
            .as_deref()
            .and_then(normalize_mime)
            .or(header)
            .unwrap_or_else(|| detect_mime_or(bytes, DEFAULT_ASSET_MIME).to_string())
    }
}

/// Bare lowercase `type/subtype`, or `None` when the value is unusable.
///
/// Generic octet-stream says nothing useful, so it is treated as absent and
/// sniffing decides instead.
fn normalize_mime(raw: &str) -> Option<String> {
    let mime = raw.split(';').next()?.trim().to_ascii_lowercase();
    (is_valid_mime(&mime) && mime != "application/octet-stream").then_some(mime)
}

/// Strip the query string so signed parameters never reach the logs.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, asset: &AssetReference) -> Result<EncodedAsset> {
        tracing::debug!("Fetching generated asset from {}", redact(&asset.url));

        let mut response = self
            .client
            .get(&asset.url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Asset request to {} failed: {}", redact(&asset.url), e);
                Error::FetchFailed(format!("request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "Asset download from {} returned status {}",
                redact(&asset.url),
                status
            );
            return Err(Error::FetchFailed(format!("status {}", status)));
        }

        let header_mime = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(normalize_mime);

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(Error::FetchFailed(format!(
                    "asset is {} bytes, limit is {}",
                    length, self.max_bytes
                )));
            }
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::FetchFailed(format!("failed to read body: {}", e.without_url())))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(Error::FetchFailed(format!(
                    "asset exceeds the {} byte limit",
                    self.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(Error::FetchFailed("response body is empty".to_string()));
        }

        let mime = Self::resolve_mime(asset, header_mime, &bytes);
        tracing::info!("Fetched {} byte asset ({})", bytes.len(), mime);
        Ok(EncodedAsset::new(mime, bytes))
    }
}
