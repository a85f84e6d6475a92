//! Asset download and transcoding
//!
//! Turns a temporary, authenticated asset URL into a self-contained
//! [`EncodedAsset`] so the presentation layer needs no further network access.

pub mod client;
pub mod mock;

pub use client::HttpAssetFetcher;
pub use mock::MockAssetFetcher;

use crate::datauri::EncodedAsset;
use crate::operation::AssetReference;
use crate::Result;
use async_trait::async_trait;

/// Content type assumed when neither the provider nor the bytes say otherwise.
pub const DEFAULT_ASSET_MIME: &str = "video/mp4";

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, asset: &AssetReference) -> Result<EncodedAsset>;
}
