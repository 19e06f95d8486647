use axum::{Form, extract::State, http::StatusCode};
use chrono::Utc;
use maud::Markup;
use tracing::warn;

use crate::error::ApiError;
use crate::participations::QuinielaForm;
use crate::state::AppState;
use crate::views::{self, FormState};

/// GET /
pub async fn index(State(state): State<AppState>) -> Markup {
    let snapshot = state.board.snapshot();
    views::quiniela_page(&snapshot, state.display_tz, &FormState::default())
}

/// POST /: the quiniela form. A rejected submission re-renders the page with
/// the message and everything the user had entered.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(fields): Form<Vec<(String, String)>>,
) -> (StatusCode, Markup) {
    let snapshot = state.board.snapshot();

    let mut form = match QuinielaForm::parse(fields) {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected quiniela form: {}", e);
            let page = FormState {
                error: Some(e.user_message()),
                ..FormState::default()
            };
            return (e.status(), views::quiniela_page(&snapshot, state.display_tz, &page));
        }
    };

    let result = state
        .flow
        .submit(snapshot.matches(), &mut form.selections, &form.contact, Utc::now())
        .await;

    match result {
        Ok(receipt) => (StatusCode::OK, views::confirmation_page(&receipt, &state.payment)),
        Err(e) => {
            let e = ApiError::from(e);
            let page = FormState {
                contact: Some(&form.contact),
                selections: Some(&form.selections),
                scores: Some(&form.scores),
                error: Some(e.user_message()),
            };
            (e.status(), views::quiniela_page(&snapshot, state.display_tz, &page))
        }
    }
}

/// GET /ranking
pub async fn ranking(State(state): State<AppState>) -> Markup {
    let rows = state.loader.load_ranking().await;
    views::ranking_page(&rows)
}
