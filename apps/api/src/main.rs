mod config;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod search_client;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::explain::LlmExplainer;
use crate::matching::tables::MatchTables;
use crate::routes::build_router;
use crate::search_client::SerpApiClient;
use crate::state::AppState;
use crate::store::InMemoryRunStore;

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

    info!("Starting OppMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Fixed reference tables, loaded once
    let tables = Arc::new(MatchTables::builtin());
    info!("Reference tables loaded: {} tracks", tables.track_titles.len());

    // Search provider
    let search = Arc::new(SerpApiClient::new(config.search_api_key.clone())?);
    info!("Search client initialized");

    // LLM-backed explainer
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    let explainer = Arc::new(LlmExplainer::new(llm));
    info!("LLM explainer initialized (model: {})", llm_client::MODEL);

    // In-memory run store — cleared on restart by design
    let runs = Arc::new(InMemoryRunStore::default());

    // Build app state
    let state = AppState {
        config: config.clone(),
        tables,
        search,
        explainer,
        runs,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
