pub const IMAGE_ANALYSIS: &str = include_str!("../data/prompts/image_analysis.txt");
pub const HEATMAP: &str = include_str!("../data/prompts/heatmap.txt");
pub const AUDIO_ANALYSIS: &str = include_str!("../data/prompts/audio_analysis.txt");
pub const VIDEO_ANALYSIS: &str = include_str!("../data/prompts/video_analysis.txt");
pub const CREDIBILITY_TASK: &str = include_str!("../data/prompts/credibility_task.txt");
pub const CREDIBILITY_SCORING: &str = include_str!("../data/prompts/credibility_scoring.txt");
pub const CREDIBILITY_SOURCE: &str = include_str!("../data/prompts/credibility_source.txt");
pub const JSON_OUTPUT: &str = include_str!("../data/prompts/json_output.txt");

/// Script used when a demo video is requested without one.
pub const DEFAULT_DEMO_SCRIPT: &str = include_str!("../data/prompts/demo_script.txt");

/// Replace `{{key}}` placeholders in a template string.
///
/// Substitution is single-pass: placeholder-like text inside a substituted
/// value is left untouched. Unknown placeholders are kept verbatim.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        let key = &after_open[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after_open[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Join prompt fragments into one instruction, separated by blank lines.
pub fn compose<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Selects which optional fragments a flow's instruction includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptOptions {
    pub include_source_verification: bool,
}

impl Default for PromptOptions {
    fn default() -> Self {
        Self {
            include_source_verification: true,
        }
    }
}

/// Build the credibility instruction for an article.
///
/// `verification` is the locally computed source note; it is only embedded
/// when the options ask for it.
pub fn credibility_prompt(
    article_text: &str,
    source_name: &str,
    verification: Option<&str>,
    options: PromptOptions,
) -> String {
    let mut fragments = vec![
        render(
            CREDIBILITY_TASK,
            &[("source_name", source_name), ("article_text", article_text)],
        ),
        CREDIBILITY_SCORING.to_string(),
    ];

    if let (true, Some(verification)) = (options.include_source_verification, verification) {
        fragments.push(render(
            CREDIBILITY_SOURCE,
            &[("source_name", source_name), ("verification", verification)],
        ));
    }

    fragments.push(JSON_OUTPUT.to_string());
    compose(&fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_render_does_not_expand_inside_values() {
        assert_eq!(
            render("{{a}} / {{b}}", &[("a", "{{b}}"), ("b", "x")]),
            "{{b}} / x"
        );
    }

    #[test]
    fn test_render_keeps_unknown_and_unclosed_placeholders() {
        assert_eq!(render("{{missing}} {{open", &[]), "{{missing}} {{open");
    }

    #[test]
    fn test_prompts_are_non_empty() {
        for prompt in [
            IMAGE_ANALYSIS,
            HEATMAP,
            AUDIO_ANALYSIS,
            VIDEO_ANALYSIS,
            CREDIBILITY_TASK,
            CREDIBILITY_SCORING,
            CREDIBILITY_SOURCE,
            JSON_OUTPUT,
        ] {
            assert!(!prompt.trim().is_empty());
        }
    }

    #[test]
    fn test_credibility_task_has_placeholders() {
        assert!(CREDIBILITY_TASK.contains("{{article_text}}"));
        assert!(CREDIBILITY_TASK.contains("{{source_name}}"));
        assert!(CREDIBILITY_SOURCE.contains("{{verification}}"));
    }

    #[test]
    fn test_credibility_prompt_includes_verification_when_enabled() {
        let prompt = credibility_prompt(
            "Body text",
            "Daily Planet",
            Some("requires further investigation"),
            PromptOptions::default(),
        );
        assert!(prompt.contains("Body text"));
        assert!(prompt.contains("Daily Planet"));
        assert!(prompt.contains("requires further investigation"));
        assert!(prompt.ends_with("Output should be in JSON format."));
    }

    #[test]
    fn test_credibility_prompt_omits_verification_when_disabled() {
        let prompt = credibility_prompt(
            "Body text",
            "Daily Planet",
            Some("requires further investigation"),
            PromptOptions {
                include_source_verification: false,
            },
        );
        assert!(!prompt.contains("requires further investigation"));
        assert!(!prompt.contains("sourceVerification"));
    }

    #[test]
    fn test_compose_skips_blank_fragments() {
        assert_eq!(compose(&["one\n", "  ", "two"]), "one\n\ntwo");
    }
}
