use axum::{Json, extract::State};

use profetas_types::api::MatchBoardResponse;

use crate::state::AppState;

/// GET /api/matches: the current match board with per-match lock state.
pub async fn get_matches(State(state): State<AppState>) -> Json<MatchBoardResponse> {
    Json(state.board.snapshot().to_response())
}
