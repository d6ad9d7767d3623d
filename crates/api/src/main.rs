use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use scribe_api::state::AppState;
use scribe_config::AppConfig;
use scribe_services::email::EmailError;
use scribe_services::{EmailService, TaskRegistry};
use scribe_transcription::TranscriptionPipeline;
use scribe_transcription::asr::OpenAiBackend;
use scribe_transcription::media::FfmpegTool;

/// Meeting transcription server with speaker diarization.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on (overrides configuration).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load().context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let backend = Arc::new(
        OpenAiBackend::new(&config.transcription).context("transcription backend unavailable")?,
    );
    let media = Arc::new(FfmpegTool::new(&config.transcription));
    let pipeline = Arc::new(TranscriptionPipeline::new(
        config.transcription.clone(),
        media,
        backend,
    ));

    let email = match EmailService::new(&config.email) {
        Ok(service) => Some(Arc::new(service)),
        Err(EmailError::NotConfigured) => {
            warn!("No sender address configured; transcript emailing is disabled");
            None
        }
        Err(e) => anyhow::bail!("failed to build email transport: {e}"),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        pipeline,
        tasks: Arc::new(TaskRegistry::new()),
        email,
    };

    let router = scribe_api::build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Scribe API listening");
    axum::serve(listener, router).await?;

    Ok(())
}
