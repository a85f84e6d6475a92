//! Composition root: wires the Gemini clients, the asset fetcher, and the
//! source verifier into the flows and dispatches requests to them.

use crate::ai::{
    AnalysisService, GeminiAnalysisClient, GeminiImageClient, GeminiVideoClient,
    ImageGenerationService, VideoGenerationService,
};
use crate::config::Config;
use crate::fetch::{AssetFetcher, HttpAssetFetcher};
use crate::flows::{self, DemoVideoSettings};
use crate::models::{AnalysisRequest, AnalysisResult, DemoVideo, DemoVideoInput};
use crate::operation::Cancellation;
use crate::prompts::PromptOptions;
use crate::verification::{KeywordSourceVerifier, SourceVerifier};
use crate::Result;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Dispatches analysis and demo-video requests to their flows.
pub struct App {
    analysis: Box<dyn AnalysisService>,
    heatmap: Box<dyn ImageGenerationService>,
    video: Box<dyn VideoGenerationService>,
    fetcher: Box<dyn AssetFetcher>,
    verifier: Box<dyn SourceVerifier>,
    settings: AppSettings,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub analysis: Box<dyn AnalysisService>,
    pub heatmap: Box<dyn ImageGenerationService>,
    pub video: Box<dyn VideoGenerationService>,
    pub fetcher: Box<dyn AssetFetcher>,
    pub verifier: Box<dyn SourceVerifier>,
}

/// Flow tuning that is not a service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppSettings {
    pub demo_video: DemoVideoSettings,
    pub prompt_options: PromptOptions,
}

impl From<&Config> for AppSettings {
    fn from(config: &Config) -> Self {
        Self {
            demo_video: DemoVideoSettings {
                poll: config.poll,
                transient_retries: config.transient_retries,
            },
            prompt_options: config.prompt_options,
        }
    }
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices, settings: AppSettings) -> Self {
        Self {
            analysis: services.analysis,
            heatmap: services.heatmap,
            video: services.video,
            fetcher: services.fetcher,
            verifier: services.verifier,
            settings,
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn new() -> Result<Self> {
        let config = Config::from_env()?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        macro_rules! gemini_client {
            ($client:ident, $model:expr) => {{
                let client = $client::new_with_client(
                    config.gemini_api_key.clone(),
                    $model.clone(),
                    http_client.clone(),
                );
                match &config.gemini_base_url {
                    Some(url) => client.with_base_url(url.clone()),
                    None => client,
                }
            }};
        }

        info!("Analysis model: {}", config.analysis_model);
        info!("Heatmap model: {}", config.heatmap_model);
        info!("Video model: {}", config.video_model);

        let analysis = gemini_client!(GeminiAnalysisClient, config.analysis_model);
        let heatmap = gemini_client!(GeminiImageClient, config.heatmap_model);
        let video = gemini_client!(GeminiVideoClient, config.video_model);
        let fetcher = HttpAssetFetcher::new_with_client(config.gemini_api_key.clone(), http_client)
            .with_max_bytes(config.max_asset_bytes)
            .with_timeout(config.asset_timeout);

        Self::with_services(
            AppServices {
                analysis: Box::new(analysis),
                heatmap: Box::new(heatmap),
                video: Box::new(video),
                fetcher: Box::new(fetcher),
                verifier: Box::new(KeywordSourceVerifier::default()),
            },
            AppSettings::from(config),
        )
    }

    /// Run the analysis flow matching the request variant.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let span = info_span!("analysis", request_id = %Uuid::new_v4(), kind = request.kind());

        async {
            info!("Analysis requested");
            let result = match request {
                AnalysisRequest::Image(input) => {
                    flows::explain_image_manipulation(
                        self.analysis.as_ref(),
                        self.heatmap.as_ref(),
                        input,
                    )
                    .await
                    .map(AnalysisResult::Image)
                }
                AnalysisRequest::Audio(input) => {
                    flows::analyze_audio(self.analysis.as_ref(), input)
                        .await
                        .map(AnalysisResult::Audio)
                }
                AnalysisRequest::Video(input) => {
                    flows::analyze_video(self.analysis.as_ref(), input)
                        .await
                        .map(AnalysisResult::Video)
                }
                AnalysisRequest::Text(input) => flows::assess_article_credibility(
                    self.analysis.as_ref(),
                    self.verifier.as_ref(),
                    self.settings.prompt_options,
                    input,
                )
                .await
                .map(AnalysisResult::Text),
            };

            if let Err(e) = &result {
                error!("Analysis failed: {}", e);
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Generate a demo video; stops early once `cancel` fires.
    pub async fn generate_demo_video(
        &self,
        input: &DemoVideoInput,
        cancel: &Cancellation,
    ) -> Result<DemoVideo> {
        let span = info_span!("demo_video", request_id = %Uuid::new_v4());

        async {
            info!("Demo video requested");
            let result = flows::generate_demo_video(
                self.video.as_ref(),
                self.fetcher.as_ref(),
                self.settings.demo_video,
                input,
                cancel,
            )
            .await;

            if let Err(e) = &result {
                error!("Demo video generation failed: {}", e);
            }
            result
        }
        .instrument(span)
        .await
    }
}
