//! Image manipulation explanation with a best-effort heatmap.
//!
//! The judgment and the heatmap are requested concurrently and both are
//! awaited to settlement. Only the judgment is required: a failed or empty
//! heatmap degrades to an absent field, and a heatmap is never attached to an
//! image judged authentic.

use super::{generate_structured, require_text, StructuredOutput};
use crate::ai::{AnalysisService, ImageGenerationService};
use crate::datauri::EncodedAsset;
use crate::models::{ImageAnalysisInput, ImageManipulationReport};
use crate::{prompts, Error, Result};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManipulationJudgment {
    is_manipulated: bool,
    explanation: String,
}

impl StructuredOutput for ManipulationJudgment {
    fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "isManipulated": {
                    "type": "BOOLEAN",
                    "description": "True if manipulation is detected, false otherwise."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Explanation of the detected image manipulations."
                }
            },
            "required": ["isManipulated", "explanation"]
        })
    }

    fn check(self) -> std::result::Result<Self, String> {
        require_text("explanation", &self.explanation)?;
        Ok(self)
    }
}

pub async fn explain_image_manipulation(
    analysis: &dyn AnalysisService,
    heatmap: &dyn ImageGenerationService,
    input: &ImageAnalysisInput,
) -> Result<ImageManipulationReport> {
    let photo = input.validate()?;
    let media = std::slice::from_ref(&photo);

    let (judgment, heatmap_result) = tokio::join!(
        generate_structured::<ManipulationJudgment>(analysis, prompts::IMAGE_ANALYSIS, media),
        heatmap.generate_image(prompts::HEATMAP, media),
    );

    let judgment = judgment.map_err(|e| {
        error!("Image analysis failed: {}", e);
        Error::PrimaryAnalysisFailed(e.to_string())
    })?;

    let heat_map_data_uri = select_heatmap(judgment.is_manipulated, heatmap_result);

    info!(
        "Image analysis complete: manipulated={}, heatmap={}",
        judgment.is_manipulated,
        heat_map_data_uri.is_some()
    );

    Ok(ImageManipulationReport {
        is_manipulated: judgment.is_manipulated,
        explanation: judgment.explanation,
        heat_map_data_uri,
    })
}

fn select_heatmap(
    is_manipulated: bool,
    heatmap_result: Result<Option<EncodedAsset>>,
) -> Option<String> {
    match heatmap_result {
        Err(e) => {
            warn!("Heatmap generation failed, continuing without it: {}", e);
            None
        }
        Ok(None) => {
            warn!("Heatmap model returned no image");
            None
        }
        Ok(Some(_)) if !is_manipulated => {
            debug!("Discarding heatmap for an image judged authentic");
            None
        }
        Ok(Some(asset)) if asset.media_type() != "image" => {
            warn!(
                "Heatmap model returned non-image content ({})",
                asset.mime_type()
            );
            None
        }
        Ok(Some(asset)) => Some(asset.to_data_uri()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockFailure;
    use crate::ai::{MockAnalysisClient, MockImageGenerationClient};

    fn photo_input() -> ImageAnalysisInput {
        ImageAnalysisInput {
            photo_data_uri: "data:image/jpeg;base64,/9j/4AAQ".to_string(),
        }
    }

    #[tokio::test]
    async fn test_manipulated_image_gets_heatmap() {
        let analysis = MockAnalysisClient::new()
            .with_response(r#"{"isManipulated": true, "explanation": "Cloned region."}"#);
        let heatmap = MockImageGenerationClient::new();

        let report = explain_image_manipulation(&analysis, &heatmap, &photo_input())
            .await
            .unwrap();

        assert!(report.is_manipulated);
        assert!(report
            .heat_map_data_uri
            .unwrap()
            .starts_with("data:image/png;base64,"));
        assert_eq!(heatmap.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_heatmap_is_absent() {
        let analysis = MockAnalysisClient::new()
            .with_response(r#"{"isManipulated": true, "explanation": "Spliced."}"#);
        let heatmap = MockImageGenerationClient::new().with_image(None);

        let report = explain_image_manipulation(&analysis, &heatmap, &photo_input())
            .await
            .unwrap();
        assert!(report.heat_map_data_uri.is_none());
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_calls() {
        let analysis = MockAnalysisClient::new();
        let heatmap = MockImageGenerationClient::new();
        let input = ImageAnalysisInput {
            photo_data_uri: "not a data uri".to_string(),
        };

        let err = explain_image_manipulation(&analysis, &heatmap, &input)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(analysis.get_call_count(), 0);
        assert_eq!(heatmap.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_explanation_fails_primary() {
        let analysis = MockAnalysisClient::new()
            .with_response(r#"{"isManipulated": false, "explanation": "  "}"#);
        let heatmap = MockImageGenerationClient::new();

        let err = explain_image_manipulation(&analysis, &heatmap, &photo_input())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PrimaryAnalysisFailed(_)));
    }

    #[test]
    fn test_non_image_heatmap_is_dropped() {
        let asset = EncodedAsset::new("text/plain", b"hi".to_vec());
        assert!(select_heatmap(true, Ok(Some(asset))).is_none());
    }

    #[tokio::test]
    async fn test_heatmap_failure_does_not_fail_request() {
        let analysis = MockAnalysisClient::new()
            .with_response(r#"{"isManipulated": true, "explanation": "Warped edges."}"#);
        let heatmap = MockImageGenerationClient::new().with_failure(MockFailure::Transient);

        let report = explain_image_manipulation(&analysis, &heatmap, &photo_input())
            .await
            .unwrap();

        assert!(report.is_manipulated);
        assert_eq!(report.explanation, "Warped edges.");
        assert!(report.heat_map_data_uri.is_none());
    }
}
