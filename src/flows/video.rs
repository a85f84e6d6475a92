use super::{generate_structured, require_text, StructuredOutput};
use crate::ai::AnalysisService;
use crate::models::{VideoAnalysis, VideoAnalysisInput};
use crate::{prompts, Result};
use tracing::{info, warn};

impl StructuredOutput for VideoAnalysis {
    fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "isAuthentic": {
                    "type": "BOOLEAN",
                    "description": "Whether the video is authentic or not."
                },
                "deepfakeDetected": {
                    "type": "BOOLEAN",
                    "description": "Whether a deepfake was detected."
                },
                "analysisDetails": {
                    "type": "STRING",
                    "description": "Detailed analysis of the video."
                }
            },
            "required": ["isAuthentic", "deepfakeDetected", "analysisDetails"]
        })
    }

    // A clip with a detected deepfake is never reported as authentic.
    fn check(mut self) -> std::result::Result<Self, String> {
        require_text("analysisDetails", &self.analysis_details)?;
        if self.deepfake_detected && self.is_authentic {
            warn!("Model reported an authentic deepfake; marking inauthentic");
            self.is_authentic = false;
        }
        Ok(self)
    }
}

/// Check a clip for deepfake indicators.
pub async fn analyze_video(
    analysis: &dyn AnalysisService,
    input: &VideoAnalysisInput,
) -> Result<VideoAnalysis> {
    let clip = input.validate()?;

    let result: VideoAnalysis = generate_structured(
        analysis,
        prompts::VIDEO_ANALYSIS,
        std::slice::from_ref(&clip),
    )
    .await?;

    info!(
        "Video analysis complete: authentic={}, deepfake={}",
        result.is_authentic, result.deepfake_detected
    );
    Ok(result)
}
