pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ranking::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Operator form
        .route("/", get(handlers::handle_form))
        .route("/rank", post(handlers::handle_rank_page))
        // Ranking API
        .route("/api/v1/rank", post(handlers::handle_rank_api))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
