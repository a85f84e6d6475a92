use super::AssetFetcher;
use crate::datauri::EncodedAsset;
use crate::operation::AssetReference;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// In-memory [`AssetFetcher`] that records requested URLs.
#[derive(Clone)]
pub struct MockAssetFetcher {
    asset: Option<EncodedAsset>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl MockAssetFetcher {
    /// Defaults to serving a short MP4-looking payload.
    pub fn new() -> Self {
        Self {
            asset: Some(EncodedAsset::new(
                "video/mp4",
                vec![0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p'],
            )),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_asset(mut self, asset: EncodedAsset) -> Self {
        self.asset = Some(asset);
        self
    }

    /// Make every fetch fail with `FetchFailed`.
    pub fn failing(mut self) -> Self {
        self.asset = None;
        self
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

impl Default for MockAssetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetFetcher for MockAssetFetcher {
    async fn fetch(&self, asset: &AssetReference) -> Result<EncodedAsset> {
        self.requested.lock().unwrap().push(asset.url.clone());

        self.asset
            .clone()
            .ok_or_else(|| Error::FetchFailed("mock fetch failure".to_string()))
    }
}
