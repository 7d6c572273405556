mod config;
mod errors;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryResumeStore, PgResumeStore, ResumeStore};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn ResumeStore> = match &config.database_url {
        Some(url) => {
            let pg = PgResumeStore::connect(url)
                .await
                .context("failed to connect to PostgreSQL")?;
            pg.ensure_schema()
                .await
                .context("failed to prepare the resumes table")?;
            Arc::new(pg)
        }
        None => {
            info!("DATABASE_URL not set; keeping resumes in memory");
            Arc::new(MemoryResumeStore::new())
        }
    };

    let llm = LlmClient::from_config(&config).context("failed to build HTTP client")?;
    if config.llm_api_key.is_none() {
        info!("A4F_API_KEY not set; suggestions are disabled");
    }
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        store,
        llm,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
