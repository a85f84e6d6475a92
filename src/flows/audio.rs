use super::{generate_structured, require_text, StructuredOutput};
use crate::ai::AnalysisService;
use crate::models::{AudioAnalysis, AudioAnalysisInput};
use crate::{prompts, Result};
use tracing::info;

impl StructuredOutput for AudioAnalysis {
    fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "voiceCloningDetected": {
                    "type": "BOOLEAN",
                    "description": "Whether voice cloning was detected."
                },
                "syntheticAudioDetected": {
                    "type": "BOOLEAN",
                    "description": "Whether synthetic audio was detected."
                },
                "analysisDetails": {
                    "type": "STRING",
                    "description": "Detailed analysis of the audio."
                }
            },
            "required": ["voiceCloningDetected", "syntheticAudioDetected", "analysisDetails"]
        })
    }

    fn check(self) -> std::result::Result<Self, String> {
        require_text("analysisDetails", &self.analysis_details)?;
        Ok(self)
    }
}

/// Check a recording for voice cloning and synthetic generation.
pub async fn analyze_audio(
    analysis: &dyn AnalysisService,
    input: &AudioAnalysisInput,
) -> Result<AudioAnalysis> {
    let audio = input.validate()?;

    let result: AudioAnalysis = generate_structured(
        analysis,
        prompts::AUDIO_ANALYSIS,
        std::slice::from_ref(&audio),
    )
    .await?;

    info!(
        "Audio analysis complete: cloning={}, synthetic={}",
        result.voice_cloning_detected, result.synthetic_audio_detected
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockAnalysisClient;
    use crate::Error;

    fn input(uri: &str) -> AudioAnalysisInput {
        AudioAnalysisInput {
            audio_data_uri: uri.to_string(),
        }
    }

    #[tokio::test]
    async fn test_analyze_audio() {
        let analysis = MockAnalysisClient::new().with_response(
            r#"{"voiceCloningDetected": true, "syntheticAudioDetected": false, "analysisDetails": "Spectral seams at 2.1s."}"#,
        );

        let result = analyze_audio(&analysis, &input("data:audio/wav;base64,UklGRg=="))
            .await
            .unwrap();

        assert!(result.voice_cloning_detected);
        assert!(!result.synthetic_audio_detected);
        assert_eq!(
            analysis.prompts(),
            vec![prompts::AUDIO_ANALYSIS.to_string()]
        );
    }

    #[tokio::test]
    async fn test_image_payload_is_rejected() {
        let analysis = MockAnalysisClient::new();
        let err = analyze_audio(&analysis, &input("data:image/png;base64,iVBORw=="))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(analysis.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_field_is_invalid_response() {
        let analysis = MockAnalysisClient::new()
            .with_response(r#"{"voiceCloningDetected": true, "analysisDetails": "x"}"#);
        let err = analyze_audio(&analysis, &input("data:audio/mpeg;base64,SUQz"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelResponseInvalid(_)));
    }
}
