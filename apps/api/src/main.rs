mod config;
mod errors;
mod extraction;
mod imaging;
mod latex;
mod llm_client;
mod pipeline;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::imaging::convert::LibreOfficeConverter;
use crate::imaging::pdf::PdfiumRasterizer;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting {} v{}", config.app_name, env!("CARGO_PKG_VERSION"));

    for dir in [&config.upload_dir, &config.template_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    info!(
        "Uploads in {}, templates in {}",
        config.upload_dir.display(),
        config.template_dir.display()
    );

    // Initialize LLM client
    let llm = LlmClient::new(&config)?;
    info!(
        "LLM client initialized (deployment: {})",
        config.azure_openai_deployment
    );

    // Pdfium binds lazily, per render, so a missing library surfaces as a conversion failure
    let rasterizer = PdfiumRasterizer::new(config.pdfium_lib_dir.clone());
    let converter = LibreOfficeConverter::new(config.soffice_bin.clone());

    let state = AppState {
        llm: Arc::new(llm),
        rasterizer: Arc::new(rasterizer),
        converter: Arc::new(converter),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once a frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
