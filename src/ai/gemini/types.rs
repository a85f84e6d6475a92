//! Shared Gemini payload types used across analysis, image, and video modules.

use crate::datauri::EncodedAsset;
use serde::{Deserialize, Serialize};

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// A user turn carrying the media payloads followed by the instruction.
    pub fn user_with_media(prompt: &str, media: &[EncodedAsset]) -> Self {
        let mut parts: Vec<Part> = media.iter().map(Part::inline).collect();
        parts.push(Part::Text {
            text: prompt.to_string(),
        });
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }
}

/// Untagged union of text and inline media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Other(serde_json::Value),
}

impl Part {
    pub fn inline(asset: &EncodedAsset) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: asset.mime_type().to_string(),
                data: asset.to_base64(),
            },
        }
    }
}

/// Base64 inline payload used for media requests and image responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, if any.
    pub fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// First inline media part of the first candidate, if any.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        parts.iter().find_map(|p| match p {
            Part::InlineData { inline_data } => Some(inline_data),
            _ => None,
        })
    }
}

/// Candidate completion item returned by Gemini.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// `predictLongRunning` request for Veo.
#[derive(Debug, Serialize)]
pub struct PredictLongRunningRequest {
    pub instances: Vec<VideoInstance>,
    pub parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
pub struct VideoInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoParameters {
    pub aspect_ratio: String,
    pub duration_seconds: u32,
}

/// Long-running operation resource, as returned by both the start call and
/// the status call.
#[derive(Debug, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Status>,
    #[serde(default)]
    pub response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    #[serde(default)]
    pub generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    #[serde(default)]
    pub generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    pub rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct GeneratedSample {
    #[serde(default)]
    pub video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFile {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}
