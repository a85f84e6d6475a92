//! Data models and structures
//!
//! Request and result records for every flow. Field names follow the
//! dashboard's JSON contract (camelCase).

use crate::datauri::EncodedAsset;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Minimum article length (in characters) accepted by the credibility flow.
///
/// Counted after trimming surrounding whitespace, so padding cannot satisfy it.
/// This is stricter than a raw length check.
pub const MIN_ARTICLE_CHARS: usize = 100;

/// Minimum source-name length (in characters) accepted by the credibility flow.
/// Also counted after trimming.
pub const MIN_SOURCE_NAME_CHARS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisInput {
    pub photo_data_uri: String,
}

impl ImageAnalysisInput {
    pub fn validate(&self) -> Result<EncodedAsset> {
        media_payload(&self.photo_data_uri, "image")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysisInput {
    pub audio_data_uri: String,
}

impl AudioAnalysisInput {
    pub fn validate(&self) -> Result<EncodedAsset> {
        media_payload(&self.audio_data_uri, "audio")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalysisInput {
    pub video_data_uri: String,
}

impl VideoAnalysisInput {
    pub fn validate(&self) -> Result<EncodedAsset> {
        media_payload(&self.video_data_uri, "video")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleInput {
    pub article_text: String,
    pub source_name: String,
}

impl ArticleInput {
    pub fn validate(&self) -> Result<()> {
        let article_chars = self.article_text.trim().chars().count();
        if article_chars < MIN_ARTICLE_CHARS {
            return Err(Error::Validation(format!(
                "Article text must be at least {} characters long to provide a meaningful analysis (got {}).",
                MIN_ARTICLE_CHARS, article_chars
            )));
        }
        if self.source_name.trim().chars().count() < MIN_SOURCE_NAME_CHARS {
            return Err(Error::Validation(format!(
                "Source name must be at least {} characters long.",
                MIN_SOURCE_NAME_CHARS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoVideoInput {
    pub script: String,
}

impl DemoVideoInput {
    pub fn validate(&self) -> Result<()> {
        if self.script.trim().is_empty() {
            return Err(Error::Validation(
                "A script is required to generate a video.".to_string(),
            ));
        }
        Ok(())
    }
}

fn media_payload(uri: &str, media_type: &str) -> Result<EncodedAsset> {
    let asset = EncodedAsset::parse(uri)?;
    asset.require_media_type(media_type)?;
    Ok(asset)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageManipulationReport {
    pub is_manipulated: bool,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heat_map_data_uri: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioAnalysis {
    pub voice_cloning_detected: bool,
    pub synthetic_audio_detected: bool,
    pub analysis_details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAnalysis {
    pub is_authentic: bool,
    pub deepfake_detected: bool,
    pub analysis_details: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredibilityAssessment {
    pub summary: String,
    pub credibility_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_verification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoVideo {
    pub video_data_uri: String,
}

/// One analysis request from the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisRequest {
    Image(ImageAnalysisInput),
    Audio(AudioAnalysisInput),
    Video(VideoAnalysisInput),
    Text(ArticleInput),
}

impl AnalysisRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisRequest::Image(_) => "image",
            AnalysisRequest::Audio(_) => "audio",
            AnalysisRequest::Video(_) => "video",
            AnalysisRequest::Text(_) => "text",
        }
    }
}

/// Result matching the [`AnalysisRequest`] variant that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisResult {
    Image(ImageManipulationReport),
    Audio(AudioAnalysis),
    Video(VideoAnalysis),
    Text(CredibilityAssessment),
}
