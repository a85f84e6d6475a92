//! Error handling and custom error types
//!
//! Provides unified error handling across the flows using thiserror. Every
//! variant maps onto an [`ErrorKind`] so the presentation layer receives a
//! single [`FlowFailure`] value (kind + message).

use serde::Serialize;
use thiserror::Error;

/// Message shown when the provider reports a temporary overload.
pub const TRANSIENT_MESSAGE: &str =
    "The generation service is temporarily unavailable. Please try again in a few moments.";

/// Message shown when the primary image analysis produced nothing usable.
pub const PRIMARY_ANALYSIS_MESSAGE: &str = "Failed to get a valid response from the analysis model. It might be unavailable or the request timed out.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("The AI model did not return a valid analysis: {0}")]
    ModelResponseInvalid(String),

    #[error("Failed to generate video: {0}")]
    GenerationFailed(String),

    #[error("Failed to find the generated asset: {0}")]
    OutputMissing(String),

    #[error("Failed to fetch asset: {0}")]
    FetchFailed(String),

    #[error("{msg} ({0})", msg = TRANSIENT_MESSAGE)]
    TransientUnavailable(String),

    #[error("{msg} ({0})", msg = PRIMARY_ANALYSIS_MESSAGE)]
    PrimaryAnalysisFailed(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Timed out waiting for operation: {0}")]
    Timeout(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),
}

/// Stable, serializable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    ModelResponseInvalid,
    GenerationFailed,
    OutputMissing,
    FetchFailed,
    TransientUnavailable,
    PrimaryAnalysisFailed,
    Cancelled,
    Timeout,
    Provider,
    Config,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::ModelResponseInvalid(_) => ErrorKind::ModelResponseInvalid,
            Error::GenerationFailed(_) => ErrorKind::GenerationFailed,
            Error::OutputMissing(_) => ErrorKind::OutputMissing,
            Error::FetchFailed(_) => ErrorKind::FetchFailed,
            Error::TransientUnavailable(_) => ErrorKind::TransientUnavailable,
            Error::PrimaryAnalysisFailed(_) => ErrorKind::PrimaryAnalysisFailed,
            Error::Cancelled(_) => ErrorKind::Cancelled,
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::AiProvider(_) | Error::Http(_) => ErrorKind::Provider,
            Error::Config(_) | Error::EnvVar(_) => ErrorKind::Config,
            Error::Io(_) | Error::Serialization(_) => ErrorKind::Internal,
        }
    }

    /// True for provider overload signals the caller may retry with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::TransientUnavailable(_))
    }
}

/// The single failure value handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for FlowFailure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
