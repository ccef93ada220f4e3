use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::RankingModel;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Holds nothing per-invocation: no credential, no extracted text, no results.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable model backend. Default: GeminiClient.
    pub model: Arc<dyn RankingModel>,
}
