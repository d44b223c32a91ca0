use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use blindspot::accounts::{AccountStore, TokenIssuer};
use blindspot::detection_runners::DetectionWorker;
use blindspot::server::{self, AppState, ServerConfig};
use blindspot::speech::{GoogleTts, WhisperHttp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();

    let accounts = Arc::new(AccountStore::new());
    accounts.seed_admin("admin", "");

    let http = reqwest::Client::builder()
        .user_agent(concat!("blindspot/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let mut state = AppState::new(accounts)
        .with_max_upload_bytes(config.max_upload_bytes)
        .with_tts(Arc::new(GoogleTts::new(http.clone(), &config.tts_url)));

    if config.enable_auth {
        let secret = config
            .jwt_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .context("ENABLE_AUTH requires JWT_SECRET")?;
        state = state.with_tokens(TokenIssuer::new(secret, config.jwt_ttl_days));
        tracing::info!("Auth routes enabled");
    }

    match config.model_config() {
        Some(model_details) => {
            let detector = tokio::task::spawn_blocking(move || blindspot::init_detector(&model_details))
                .await?
                .context("failed to load detection model")?;
            state = state.with_detector(DetectionWorker::spawn(detector, config.detect_queue)?);
        }
        None => tracing::warn!("MODEL_PATH not set, /detect will answer 503"),
    }

    match &config.stt_url {
        Some(url) => {
            state = state.with_stt(Arc::new(WhisperHttp::new(http, url, &config.whisper_model, config.stt_api_key.clone())));
        }
        None => tracing::warn!("STT_URL not set, /stt will answer 503"),
    }

    let app = server::router(state, server::cors_layer(config.cors_list()));
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("BlindSpot API listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }
    tracing::info!("Shutting down");
}
