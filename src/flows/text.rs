//! Article credibility assessment.

use super::{generate_structured, require_text, StructuredOutput};
use crate::ai::AnalysisService;
use crate::models::{ArticleInput, CredibilityAssessment};
use crate::prompts::{self, PromptOptions};
use crate::verification::SourceVerifier;
use crate::Result;
use tracing::info;

impl StructuredOutput for CredibilityAssessment {
    fn response_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "summary": {
                    "type": "STRING",
                    "description": "A concise summary of the article."
                },
                "credibilityScore": {
                    "type": "NUMBER",
                    "description": "A score between 0 and 1 indicating the credibility of the article."
                },
                "sourceVerification": {
                    "type": "STRING",
                    "description": "Verification status of the source."
                }
            },
            "required": ["summary", "credibilityScore"]
        })
    }

    fn check(self) -> std::result::Result<Self, String> {
        require_text("summary", &self.summary)?;
        let score = self.credibility_score;
        if !score.is_finite() || !(0.0..=1.0).contains(&score) {
            return Err(format!("credibilityScore {} is outside [0, 1]", score));
        }
        Ok(self)
    }
}

/// Summarize an article and score its credibility.
///
/// When source verification is enabled the verifier's note is embedded in the
/// prompt, and it also fills `sourceVerification` if the model leaves it out.
pub async fn assess_article_credibility(
    analysis: &dyn AnalysisService,
    verifier: &dyn SourceVerifier,
    options: PromptOptions,
    input: &ArticleInput,
) -> Result<CredibilityAssessment> {
    input.validate()?;

    let source_name = input.source_name.trim();
    let note = options
        .include_source_verification
        .then(|| verifier.verify(source_name));

    let prompt =
        prompts::credibility_prompt(&input.article_text, source_name, note.as_deref(), options);
    let assessment: CredibilityAssessment = generate_structured(analysis, &prompt, &[]).await?;

    let source_verification = assessment
        .source_verification
        .filter(|v| !v.trim().is_empty())
        .or(note);

    info!(
        "Credibility assessment for {}: score={:.2}",
        source_name, assessment.credibility_score
    );

    Ok(CredibilityAssessment {
        summary: assessment.summary,
        credibility_score: assessment.credibility_score,
        source_verification,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockAnalysisClient;
    use crate::models::MIN_ARTICLE_CHARS;
    use crate::verification::KeywordSourceVerifier;
    use crate::Error;

    fn article(source: &str) -> ArticleInput {
        ArticleInput {
            article_text: "The city council approved the new budget on Tuesday. ".repeat(3),
            source_name: source.to_string(),
        }
    }

    #[tokio::test]
    async fn test_note_fills_missing_source_verification() {
        let analysis = MockAnalysisClient::new()
            .with_response(r#"{"summary": "Budget passed.", "credibilityScore": 0.8}"#);

        let result = assess_article_credibility(
            &analysis,
            &KeywordSourceVerifier::default(),
            PromptOptions::default(),
            &article("Reputable Daily"),
        )
        .await
        .unwrap();

        assert_eq!(result.credibility_score, 0.8);
        assert_eq!(
            result.source_verification.as_deref(),
            Some("Source Reputable Daily is a reputable news organization.")
        );
        assert!(analysis.prompts()[0].contains("Reputable Daily is a reputable"));
    }

    #[tokio::test]
    async fn test_model_source_verification_wins() {
        let analysis = MockAnalysisClient::new().with_response(
            r#"{"summary": "s", "credibilityScore": 0.3, "sourceVerification": "Unverified blog."}"#,
        );

        let result = assess_article_credibility(
            &analysis,
            &KeywordSourceVerifier::default(),
            PromptOptions::default(),
            &article("Some Blog"),
        )
        .await
        .unwrap();

        assert_eq!(
            result.source_verification.as_deref(),
            Some("Unverified blog.")
        );
    }

    #[tokio::test]
    async fn test_verification_disabled() {
        let reply = r#"{"summary": "s", "credibilityScore": 0.5}"#;
        let analysis = MockAnalysisClient::new().with_response(reply);
        let options = PromptOptions {
            include_source_verification: false,
        };

        let result = assess_article_credibility(
            &analysis,
            &KeywordSourceVerifier::default(),
            options,
            &article("Reputable Daily"),
        )
        .await
        .unwrap();

        assert!(result.source_verification.is_none());
        assert!(!analysis.prompts()[0].contains("reputable news organization"));
    }

    #[tokio::test]
    async fn test_score_out_of_range_is_invalid_response() {
        let reply = r#"{"summary": "s", "credibilityScore": 1.7}"#;
        let analysis = MockAnalysisClient::new().with_response(reply);

        let err = assess_article_credibility(
            &analysis,
            &KeywordSourceVerifier::default(),
            PromptOptions::default(),
            &article("Reputable Daily"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::ModelResponseInvalid(_)));
    }

    #[tokio::test]
    async fn test_short_article_makes_no_call() {
        let analysis = MockAnalysisClient::new();
        let input = ArticleInput {
            article_text: "x".repeat(MIN_ARTICLE_CHARS - 1),
            source_name: "Reputable Daily".to_string(),
        };

        let err = assess_article_credibility(
            &analysis,
            &KeywordSourceVerifier::default(),
            PromptOptions::default(),
            &input,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(analysis.get_call_count(), 0);
    }
}
