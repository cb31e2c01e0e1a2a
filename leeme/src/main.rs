use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leeme::api::{create_router, AppState};
use leeme::config::{Config, PipelineVariant};
use leeme::ocr::OcrProvider;

#[derive(Parser)]
#[command(name = "leeme")]
#[command(about = "Image-to-text service backed by Tesseract")]
struct Args {
    /// Cleanup pipeline to run: `basic` or `enhanced` (overrides OCR_PIPELINE)
    #[arg(long)]
    pipeline: Option<PipelineVariant>,

    /// Bind host (overrides LEEME_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides LEEME_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leeme=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match args.pipeline {
        Some(pipeline) => Config::for_pipeline(pipeline),
        None => Config::from_env(),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!(
        "Initializing OCR engine ({} pipeline, languages={})...",
        config.ocr.pipeline,
        config.ocr.languages
    );
    let ocr = OcrProvider::new(&config.ocr);
    if ocr.is_available() {
        tracing::info!("OCR engine ready: {}", ocr.engine_name());
    } else {
        tracing::warn!("OCR unavailable - /ocr requests will answer 503");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_router(AppState::new(config, ocr));

    tracing::info!("Leeme starting on http://{}", addr);
    tracing::info!("  Upload form: http://{}/", addr);
    tracing::info!("  OCR endpoint: POST http://{}/ocr", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
