mod analysis;
mod config;
mod errors;
mod extraction;
mod models;
mod routes;
mod state;
mod taxonomy;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::orchestrator::{Analyzer, AnalyzerSettings};
use crate::config::Config;
use crate::extraction::DocumentTextExtractor;
use crate::routes::build_router;
use crate::state::AppState;
use crate::taxonomy::Taxonomy;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Reference data is validated once here; a bad file stops startup
    let taxonomy = Arc::new(Taxonomy::load(config.taxonomy_path.as_deref())?);

    let settings = AnalyzerSettings::from(&config);
    info!(
        "Extraction timeout {}s, upload limit {} bytes, weights {:?}",
        settings.extraction_timeout.as_secs(),
        config.max_upload_bytes,
        settings.weights
    );

    let extractor = Arc::new(DocumentTextExtractor::new(config.max_concurrent_extractions));
    let analyzer = Analyzer::new(taxonomy, extractor, settings);

    let state = AppState {
        config: config.clone(),
        analyzer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        // TODO: restrict origins once the web client has a fixed host
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
