mod cli;
mod config;
mod contact;
mod content;
mod errors;
mod export;
mod models;
mod notify;
mod observability;
mod page;
mod resume;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::content::source_from_location;
use crate::observability::TracingSink;
use crate::page::HtmlPage;
use crate::resume::{spawn_initializer, BuiltinPdfLoader, PdfTheme};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio v{}", env!("CARGO_PKG_VERSION"));

    let state = build_state(&config).await?;
    spawn_initializer(state.loader.store().subscribe(), Arc::clone(&state.resume));

    match cli.command {
        Commands::Serve { port } => serve(state, port.unwrap_or(config.port)).await,
        Commands::Build { out } => {
            for path in export::export_site(&state, &out).await? {
                info!(path = %path.display(), "Wrote");
            }
            Ok(())
        }
    }
}

async fn build_state(config: &Config) -> Result<AppState> {
    let skeleton = config.skeleton_path();
    let page = HtmlPage::load(&skeleton)
        .await
        .with_context(|| format!("Failed to load page skeleton {}", skeleton.display()))?;
    info!(regions = page.region_names().len(), "Page skeleton loaded");

    let theme = match &config.theme_path {
        Some(path) => PdfTheme::from_file(path)?,
        None => PdfTheme::default(),
    };

    let source = source_from_location(&config.content_source, config.fetch_timeout)?;
    info!(source = %source.location(), "Content source configured");

    Ok(AppState::new(
        config.clone(),
        page,
        source,
        Arc::new(BuiltinPdfLoader),
        theme,
        Arc::new(TracingSink),
    ))
}

async fn serve(state: AppState, port: u16) -> Result<()> {
    // The fallback markup is served until a load succeeds.
    if let Err(e) = state.reload().await {
        warn!(error = %e, "Initial content load failed; serving fallback markup");
    }

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
