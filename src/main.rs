use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use guardian_ai::app::App;
use guardian_ai::datauri::EncodedAsset;
use guardian_ai::error::FlowFailure;
use guardian_ai::mime::{detect_mime, extension_for, mime_from_extension};
use guardian_ai::models::{
    AnalysisRequest, ArticleInput, AudioAnalysisInput, DemoVideoInput, ImageAnalysisInput,
    VideoAnalysisInput,
};
use guardian_ai::operation::cancellation;
use guardian_ai::prompts::DEFAULT_DEMO_SCRIPT;
use guardian_ai::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "guardian-ai")]
#[command(about = "Detect manipulated media and assess article credibility")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Explain manipulation in a photo and highlight it with a heatmap.
    Image {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Check a recording for voice cloning or synthetic audio.
    Audio {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Check a clip for deepfake indicators.
    Video {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Summarize an article and score its credibility.
    Text {
        /// Name of the publishing source.
        #[arg(long, value_name = "NAME")]
        source: String,
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Generate a short demo video from a script.
    DemoVideo {
        #[arg(long)]
        script: Option<String>,
        /// Where to write the video (default: output/<date>_<uuid>.<ext>).
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guardian_ai=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let app = match App::new() {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            exit_with_failure(&e)
        }
    };

    match run(&app, args.command).await {
        Ok(output) => {
            let json = serde_json::to_string_pretty(&output).context("serialize result")?;
            println!("{}", json);
            Ok(())
        }
        Err(e) => exit_with_failure(&e),
    }
}

fn exit_with_failure(err: &Error) -> ! {
    let failure = FlowFailure::from(err);
    match serde_json::to_string_pretty(&failure) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{}", failure.message),
    }
    std::process::exit(1);
}

async fn run(app: &App, command: Command) -> guardian_ai::Result<serde_json::Value> {
    let request = match command {
        Command::Image { file } => AnalysisRequest::Image(ImageAnalysisInput {
            photo_data_uri: load_asset(&file)?.to_data_uri(),
        }),
        Command::Audio { file } => AnalysisRequest::Audio(AudioAnalysisInput {
            audio_data_uri: load_asset(&file)?.to_data_uri(),
        }),
        Command::Video { file } => AnalysisRequest::Video(VideoAnalysisInput {
            video_data_uri: load_asset(&file)?.to_data_uri(),
        }),
        Command::Text { source, file } => AnalysisRequest::Text(ArticleInput {
            article_text: fs::read_to_string(&file)?,
            source_name: source,
        }),
        Command::DemoVideo { script, output } => {
            return generate_demo_video(app, script, output).await;
        }
    };

    let result = app.analyze(&request).await?;
    Ok(serde_json::to_value(result)?)
}

async fn generate_demo_video(
    app: &App,
    script: Option<String>,
    output: Option<PathBuf>,
) -> guardian_ai::Result<serde_json::Value> {
    let input = DemoVideoInput {
        script: script.unwrap_or_else(|| DEFAULT_DEMO_SCRIPT.to_string()),
    };

    let (handle, cancel) = cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling video generation");
            handle.cancel();
        }
    });

    info!("Generating demo video, this may take a minute or two");
    let video = app.generate_demo_video(&input, &cancel).await?;
    let asset = EncodedAsset::parse(&video.video_data_uri)?;

    let path = output.unwrap_or_else(|| default_output_path(asset.mime_type()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, asset.bytes())?;
    info!("Saved demo video to {}", path.display());

    Ok(serde_json::json!({
        "videoFile": path.display().to_string(),
        "mimeType": asset.mime_type(),
        "bytes": asset.bytes().len(),
    }))
}

/// Read a media file and label it by content, falling back to its extension.
fn load_asset(path: &Path) -> guardian_ai::Result<EncodedAsset> {
    let bytes = fs::read(path)?;
    let mime = detect_mime(&bytes)
        .or_else(|| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .and_then(mime_from_extension)
        })
        .ok_or_else(|| {
            Error::Validation(format!(
                "Could not determine the media type of {}",
                path.display()
            ))
        })?;
    Ok(EncodedAsset::new(mime, bytes))
}

fn default_output_path(mime_type: &str) -> PathBuf {
    let date = Local::now().format("%Y-%m-%d");
    PathBuf::from("output").join(format!(
        "{}_{}.{}",
        date,
        Uuid::new_v4(),
        extension_for(mime_type)
    ))
}
