use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use vitae::autosave::{AutoSaver, FileStore};
use vitae::config::Config;
use vitae::layout::PageGeometry;
use vitae::llm_client::LlmClient;
use vitae::mailer::EmailClient;
use vitae::optimize::LlmResumeOptimizer;
use vitae::routes::build_router;
use vitae::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Vitae API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client. A missing key only fails optimize-resume calls.
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; /api/optimize-resume will fail until it is");
    }
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());
    let optimizer = Arc::new(LlmResumeOptimizer::new(llm));

    // Initialize email client
    if config.email_api_key.is_none() {
        warn!("EMAIL_API_KEY is not set; /api/send-email will fail until it is");
    }
    let mailer = EmailClient::new(
        config.email_api_url.clone(),
        config.email_api_key.clone(),
        config.email_from.clone(),
    )?;

    // Initialize draft persistence
    let store = FileStore::new(&config.autosave_dir).await?;
    let autosaver = Arc::new(AutoSaver::new(Arc::new(store), config.autosave_delay));
    info!(
        "Auto-save initialized ({}, {}ms debounce)",
        config.autosave_dir.display(),
        config.autosave_delay.as_millis()
    );

    let page_geometry = PageGeometry::default();
    info!(
        "Layout page geometry: {}px page, {}px usable",
        page_geometry.page_height,
        page_geometry.usable_height()
    );

    let state = AppState {
        config: config.clone(),
        optimizer,
        mailer,
        autosaver: autosaver.clone(),
        page_geometry,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Don't lose an edit that was still inside the debounce window.
    if !autosaver.flush().await {
        warn!("Auto-save: pending draft could not be written on shutdown");
    }
    info!("Shut down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
