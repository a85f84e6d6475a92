//! Demo video generation: start a long-running job, poll it to completion,
//! then download the result into a data URI.

use crate::ai::{VideoGenerationRequest, VideoGenerationService};
use crate::fetch::AssetFetcher;
use crate::models::{DemoVideo, DemoVideoInput};
use crate::operation::{Cancellation, GenerationOperation, OperationPoller, PollPolicy};
use crate::{Error, Result};
use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::RetryIf;
use tracing::{info, warn};

/// Knobs for [`generate_demo_video`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DemoVideoSettings {
    pub poll: PollPolicy,
    /// Extra attempts at starting the job while the provider reports 503.
    pub transient_retries: usize,
}

pub async fn generate_demo_video(
    video: &dyn VideoGenerationService,
    fetcher: &dyn AssetFetcher,
    settings: DemoVideoSettings,
    input: &DemoVideoInput,
    cancel: &Cancellation,
) -> Result<DemoVideo> {
    input.validate()?;

    let request = VideoGenerationRequest::new(input.script.trim());
    let operation = start_with_retry(video, &request, settings.transient_retries).await?;
    info!("Video generation started: {}", operation.handle);

    let reference = OperationPoller::new(video, settings.poll)
        .wait(operation, cancel)
        .await?;

    let asset = fetcher.fetch(&reference).await?;
    info!(
        "Demo video ready: {} ({} bytes)",
        asset.mime_type(),
        asset.bytes().len()
    );

    Ok(DemoVideo {
        video_data_uri: asset.to_data_uri(),
    })
}

async fn start_with_retry(
    video: &dyn VideoGenerationService,
    request: &VideoGenerationRequest,
    retries: usize,
) -> Result<GenerationOperation> {
    // 500ms, 1s, 2s, ... capped at 8s
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(250)
        .max_delay(Duration::from_secs(8))
        .take(retries);

    RetryIf::spawn(
        strategy,
        || video.start_generation(request),
        |e: &Error| {
            if e.is_transient() {
                warn!("Video model unavailable, retrying start: {}", e);
                true
            } else {
                false
            }
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockFailure;
    use crate::ai::MockVideoGenerationClient;
    use crate::datauri::EncodedAsset;
    use crate::fetch::MockAssetFetcher;
    use crate::operation::{cancellation, AssetReference};

    fn script() -> DemoVideoInput {
        DemoVideoInput {
            script: "A newsroom analyst uploads a photo and sees a heatmap.".to_string(),
        }
    }

    fn finished() -> GenerationOperation {
        GenerationOperation::succeeded(
            "operations/mock",
            Some(AssetReference {
                url: "https://files.example/video:download?alt=media".to_string(),
                content_type: Some("video/mp4".to_string()),
            }),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_generates_video_data_uri() {
        let video = MockVideoGenerationClient::new().with_check_responses(vec![
            GenerationOperation::pending("operations/mock"),
            finished(),
        ]);
        let fetcher =
            MockAssetFetcher::new().with_asset(EncodedAsset::new("video/mp4", vec![1, 2, 3]));

        let result = generate_demo_video(
            &video,
            &fetcher,
            DemoVideoSettings::default(),
            &script(),
            &Cancellation::never(),
        )
        .await
        .unwrap();

        assert_eq!(result.video_data_uri, "data:video/mp4;base64,AQID");
        assert_eq!(video.start_count(), 1);
        assert_eq!(video.check_count(), 2);
        assert_eq!(
            fetcher.requested_urls(),
            vec!["https://files.example/video:download?alt=media".to_string()]
        );
    }

    #[tokio::test]
    async fn test_blank_script_starts_nothing() {
        let video = MockVideoGenerationClient::new();
        let fetcher = MockAssetFetcher::new();
        let input = DemoVideoInput {
            script: " \n ".to_string(),
        };

        let err = generate_demo_video(
            &video,
            &fetcher,
            DemoVideoSettings::default(),
            &input,
            &Cancellation::never(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(video.start_count(), 0);
    }

    #[tokio::test]
    async fn test_transient_start_without_retries() {
        let video = MockVideoGenerationClient::new().with_start_failure(MockFailure::Transient);
        let fetcher = MockAssetFetcher::new();

        let err = generate_demo_video(
            &video,
            &fetcher,
            DemoVideoSettings::default(),
            &script(),
            &Cancellation::never(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::TransientUnavailable(_)));
        assert!(err.to_string().contains("temporarily unavailable"));
        assert_eq!(video.start_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_start_is_retried() {
        let video = MockVideoGenerationClient::new()
            .with_start_failure(MockFailure::Transient)
            .with_start_failure(MockFailure::Transient)
            .with_start_response(finished());
        let fetcher = MockAssetFetcher::new();
        let settings = DemoVideoSettings {
            transient_retries: 3,
            ..DemoVideoSettings::default()
        };

        let result = generate_demo_video(
            &video,
            &fetcher,
            settings,
            &script(),
            &Cancellation::never(),
        )
        .await
        .unwrap();

        assert!(result.video_data_uri.starts_with("data:video/mp4;base64,"));
        assert_eq!(video.start_count(), 3);
        assert_eq!(video.check_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_error_is_not_retried() {
        let video = MockVideoGenerationClient::new()
            .with_start_failure(MockFailure::Provider("bad request".to_string()));
        let fetcher = MockAssetFetcher::new();
        let settings = DemoVideoSettings {
            transient_retries: 3,
            ..DemoVideoSettings::default()
        };

        let err = generate_demo_video(
            &video,
            &fetcher,
            settings,
            &script(),
            &Cancellation::never(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::AiProvider(_)));
        assert_eq!(video.start_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_surfaces() {
        let video = MockVideoGenerationClient::new().with_start_response(finished());
        let fetcher = MockAssetFetcher::new().failing();

        let err = generate_demo_video(
            &video,
            &fetcher,
            DemoVideoSettings::default(),
            &script(),
            &Cancellation::never(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::FetchFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_generation_skips_fetch() {
        let video = MockVideoGenerationClient::new()
            .with_check_responses(vec![GenerationOperation::pending("operations/mock")]);
        let fetcher = MockAssetFetcher::new();
        let (handle, cancel) = cancellation();
        handle.cancel();

        let err = generate_demo_video(
            &video,
            &fetcher,
            DemoVideoSettings::default(),
            &script(),
            &cancel,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Cancelled(_)));
        assert!(fetcher.requested_urls().is_empty());
    }
}
