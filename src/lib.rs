//! GuardianAI - media manipulation detection and article credibility checks
//!
//! Wraps Gemini models behind typed flows: image manipulation explanation with
//! a heatmap, audio and video authenticity analysis, article credibility
//! scoring, and Veo demo video generation driven to completion by polling.

pub mod ai;
pub mod app;
pub mod config;
pub mod datauri;
pub mod error;
pub mod fetch;
pub mod flows;
pub mod mime;
pub mod models;
pub mod operation;
pub mod prompts;
pub mod verification;

pub use error::{Error, Result};
