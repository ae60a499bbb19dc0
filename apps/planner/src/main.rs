mod config;
mod errors;
mod layout;
mod llm_client;
mod planning;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on unparseable values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lesson planner v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the model server client
    let llm = LlmClient::new(config.ollama_url.clone(), config.ollama_model.clone())
        .context("Failed to build HTTP client")?;
    info!(
        "LLM client initialized (model: {}, url: {}, timeout: {}s)",
        config.ollama_model,
        config.ollama_url,
        config.generate_timeout.as_secs()
    );

    let state = AppState::new(Arc::new(llm), config.clone());
    info!(
        "Layout: {:?} {}x{}pt, header title '{}'",
        state.layout.paper,
        state.layout.page_width_pt,
        state.layout.page_height_pt,
        config.institute_name
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
