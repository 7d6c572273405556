use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres or in-memory, chosen at startup from `DATABASE_URL`.
    pub store: Arc<dyn ResumeStore>,
    pub llm: LlmClient,
    pub config: Config,
}
