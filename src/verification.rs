//! Source verification notes for the credibility flow.
//!
//! There is no fact-checking database behind this; the default verifier only
//! recognises sources that label themselves reputable. A real lookup slots in
//! behind [`SourceVerifier`].

/// Produces a short verification note for a news source.
pub trait SourceVerifier: Send + Sync {
    fn verify(&self, source_name: &str) -> String;
}

/// Keyword heuristic: trusts sources whose name contains a marker word.
#[derive(Debug, Clone)]
pub struct KeywordSourceVerifier {
    trusted_markers: Vec<String>,
}

impl KeywordSourceVerifier {
    pub fn new(trusted_markers: Vec<String>) -> Self {
        Self {
            trusted_markers: trusted_markers
                .into_iter()
                .map(|m| m.to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordSourceVerifier {
    fn default() -> Self {
        Self::new(vec!["reputable".to_string()])
    }
}

impl SourceVerifier for KeywordSourceVerifier {
    fn verify(&self, source_name: &str) -> String {
        let source = source_name.trim();
        let lowered = source.to_lowercase();
        if self.trusted_markers.iter().any(|m| lowered.contains(m)) {
            format!("Source {} is a reputable news organization.", source)
        } else {
            format!("Source {} requires further investigation.", source)
        }
    }
}
