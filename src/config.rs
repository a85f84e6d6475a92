//! Process configuration read from the environment (and `.env`).

use crate::fetch::client::{DEFAULT_ASSET_TIMEOUT, DEFAULT_MAX_ASSET_BYTES};
use crate::operation::PollPolicy;
use crate::prompts::PromptOptions;
use crate::{Error, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_HEATMAP_MODEL: &str = "gemini-2.5-flash-image-preview";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-2.0-generate-001";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_base_url: Option<String>,
    pub analysis_model: String,
    pub heatmap_model: String,
    pub video_model: String,
    pub poll: PollPolicy,
    pub max_asset_bytes: usize,
    pub asset_timeout: Duration,
    pub transient_retries: usize,
    pub prompt_options: PromptOptions,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        check_dotenv(dotenvy::dotenv())?;
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let gemini_api_key = var("GEMINI_API_KEY")
            .or_else(|| var("GOOGLE_API_KEY"))
            .ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        let interval_secs: u64 = parse_or(&var, "POLL_INTERVAL_SECS", 5)?;
        if interval_secs == 0 {
            return Err(Error::Config(
                "POLL_INTERVAL_SECS must be at least 1".to_string(),
            ));
        }
        let timeout_secs: u64 = parse_or(&var, "POLL_TIMEOUT_SECS", 600)?;
        let max_attempts = var("POLL_MAX_ATTEMPTS")
            .map(|v| parse_value::<usize>("POLL_MAX_ATTEMPTS", &v))
            .transpose()?;

        Ok(Self {
            gemini_api_key,
            gemini_base_url: var("GEMINI_BASE_URL"),
            analysis_model: var("ANALYSIS_MODEL")
                .unwrap_or_else(|| DEFAULT_ANALYSIS_MODEL.to_string()),
            heatmap_model: var("HEATMAP_MODEL")
                .unwrap_or_else(|| DEFAULT_HEATMAP_MODEL.to_string()),
            video_model: var("VIDEO_MODEL").unwrap_or_else(|| DEFAULT_VIDEO_MODEL.to_string()),
            poll: PollPolicy {
                interval: Duration::from_secs(interval_secs),
                max_attempts,
                // 0 disables the wall-clock deadline.
                deadline: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            },
            max_asset_bytes: parse_or(&var, "MAX_ASSET_BYTES", DEFAULT_MAX_ASSET_BYTES)?,
            asset_timeout: Duration::from_secs(parse_or(
                &var,
                "ASSET_TIMEOUT_SECS",
                DEFAULT_ASSET_TIMEOUT.as_secs(),
            )?),
            transient_retries: parse_or(&var, "TRANSIENT_RETRIES", 0)?,
            prompt_options: PromptOptions {
                include_source_verification: parse_bool_or(&var, "SOURCE_VERIFICATION", true)?,
            },
        })
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn check_dotenv<T>(result: std::result::Result<T, dotenvy::Error>) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value '{}' for {}", value, key)))
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(var: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match var(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(Error::Config(format!("Invalid value '{}' for {}", v, key))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("GEMINI_API_KEY", "abc")]).unwrap();
        assert_eq!(config.gemini_api_key, "abc");
        assert_eq!(config.analysis_model, DEFAULT_ANALYSIS_MODEL);
        assert_eq!(config.video_model, DEFAULT_VIDEO_MODEL);
        assert_eq!(config.poll, PollPolicy::default());
        assert_eq!(config.max_asset_bytes, DEFAULT_MAX_ASSET_BYTES);
        assert_eq!(config.asset_timeout, DEFAULT_ASSET_TIMEOUT);
        assert_eq!(config.transient_retries, 0);
        assert!(config.prompt_options.include_source_verification);
        assert!(config.gemini_base_url.is_none());
    }

    #[test]
    fn test_google_api_key_fallback() {
        let config = config_from(&[("GOOGLE_API_KEY", "g")]).unwrap();
        assert_eq!(config.gemini_api_key, "g");
    }

    #[test]
    fn test_missing_key_is_config_error() {
        assert!(matches!(config_from(&[]), Err(Error::Config(_))));
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "  ")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_poll_overrides() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "abc"),
            ("POLL_INTERVAL_SECS", "2"),
            ("POLL_TIMEOUT_SECS", "0"),
            ("POLL_MAX_ATTEMPTS", "30"),
        ])
        .unwrap();
        assert_eq!(config.poll.interval, Duration::from_secs(2));
        assert_eq!(config.poll.deadline, None);
        assert_eq!(config.poll.max_attempts, Some(30));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "abc"), ("POLL_INTERVAL_SECS", "soon")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "abc"), ("POLL_INTERVAL_SECS", "0")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_source_verification_toggle() {
        let config =
            config_from(&[("GEMINI_API_KEY", "abc"), ("SOURCE_VERIFICATION", "off")]).unwrap();
        assert!(!config.prompt_options.include_source_verification);

        assert!(matches!(
            config_from(&[("GEMINI_API_KEY", "abc"), ("SOURCE_VERIFICATION", "maybe")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_asset_timeout_override() {
        let config =
            config_from(&[("GEMINI_API_KEY", "abc"), ("ASSET_TIMEOUT_SECS", "30")]).unwrap();
        assert_eq!(config.asset_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_dotenv_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));
        assert!(check_dotenv(result).is_ok());
    }

    #[test]
    fn test_malformed_dotenv_is_env_var_error() {
        let err = check_dotenv::<()>(Err(dotenvy::Error::LineParse(
            "GEMINI_API_KEY abc".to_string(),
            15,
        )))
        .unwrap_err();
        assert!(matches!(err, Error::EnvVar(_)));
        assert_eq!(err.kind(), crate::error::ErrorKind::Config);
    }
}
