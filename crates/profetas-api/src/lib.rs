pub mod error;
pub mod matches;
pub mod pages;
pub mod participations;
pub mod ranking;
pub mod state;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// All routes of the service. Layers (CORS, tracing) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index).post(pages::submit_form))
        .route("/ranking", get(pages::ranking))
        .route("/api/matches", get(matches::get_matches))
        .route("/api/ranking", get(ranking::get_ranking))
        .route("/api/participaciones", post(participations::create_participation))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
