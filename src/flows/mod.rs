//! One async function per request variant.
//!
//! Every flow takes its collaborators explicitly, validates its input before
//! touching the network, and returns exactly one record or one error.

pub mod audio;
pub mod demo_video;
pub mod image;
pub mod text;
pub mod video;

pub use audio::analyze_audio;
pub use demo_video::{generate_demo_video, DemoVideoSettings};
pub use image::explain_image_manipulation;
pub use text::assess_article_credibility;
pub use video::analyze_video;

use crate::ai::AnalysisService;
use crate::datauri::EncodedAsset;
use crate::{Error, Result};
use serde::de::DeserializeOwned;

/// A record the model is asked to produce in JSON mode.
pub trait StructuredOutput: DeserializeOwned + Sized {
    /// Gemini `responseSchema` (OpenAPI subset) describing the record.
    fn response_schema() -> serde_json::Value;

    /// Normalize and check the parsed record; `Err` carries the reason it is
    /// unusable.
    fn check(self) -> std::result::Result<Self, String> {
        Ok(self)
    }
}

/// Ask the model for a `T`, treating anything unparsable or failing
/// [`StructuredOutput::check`] as `ModelResponseInvalid`.
pub async fn generate_structured<T: StructuredOutput>(
    service: &dyn AnalysisService,
    prompt: &str,
    media: &[EncodedAsset],
) -> Result<T> {
    let schema = T::response_schema();
    let text = service.generate_json(prompt, media, &schema).await?;

    let parsed: T = serde_json::from_str(text.trim()).map_err(|e| {
        tracing::error!("Model output did not match the expected shape: {}", e);
        Error::ModelResponseInvalid(format!("unexpected response shape: {}", e))
    })?;

    parsed.check().map_err(Error::ModelResponseInvalid)
}

pub(crate) fn require_text(field: &str, value: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("'{}' is empty", field))
    } else {
        Ok(())
    }
}
