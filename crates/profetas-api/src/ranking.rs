use axum::{Json, extract::State};

use profetas_types::api::RankingRow;

use crate::state::AppState;

/// GET /api/ranking: profiles ordered by points. Empty when the store is
/// unreachable.
pub async fn get_ranking(State(state): State<AppState>) -> Json<Vec<RankingRow>> {
    Json(state.loader.load_ranking().await)
}
