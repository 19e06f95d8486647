use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::warn;

use profetas_core::score::ScoreEntry;
use profetas_core::selection::Selections;
use profetas_core::submission::{ContactDetails, Receipt};
use profetas_types::api::{SubmitRequest, SubmitResponse};
use profetas_types::models::{MatchId, Selection};

use crate::error::ApiError;
use crate::state::AppState;

/// What the quiniela form posts: contact fields, `pick_<id>` radio values and
/// optional `home_<id>` / `away_<id>` score boxes.
#[derive(Debug, Default)]
pub struct QuinielaForm {
    pub contact: ContactDetails,
    pub selections: Selections,
    pub scores: BTreeMap<MatchId, ScoreEntry>,
}

impl QuinielaForm {
    /// Fields are applied in order, so a later `pick_<id>` overwrites an
    /// earlier one. A complete score counts as a pick for matches without an
    /// explicit one.
    pub fn parse(fields: Vec<(String, String)>) -> Result<Self, ApiError> {
        let mut form = Self::default();

        for (name, value) in fields {
            if name == "nombre" {
                form.contact.nombre = value;
            } else if name == "telefono" {
                form.contact.telefono = value;
            } else if let Some(id) = name.strip_prefix("pick_") {
                let match_id = parse_match_id(&name, id)?;
                let pick: Selection = value.parse().map_err(|_| ApiError::InvalidField(name.clone()))?;
                form.selections.select(match_id, pick);
            } else if let Some(id) = name.strip_prefix("home_") {
                let entry = form.scores.entry(parse_match_id(&name, id)?).or_default();
                if !entry.set_home(&value) {
                    warn!("Ignoring non-numeric score {:?} in {}", value, name);
                }
            } else if let Some(id) = name.strip_prefix("away_") {
                let entry = form.scores.entry(parse_match_id(&name, id)?).or_default();
                if !entry.set_away(&value) {
                    warn!("Ignoring non-numeric score {:?} in {}", value, name);
                }
            }
        }

        for (match_id, entry) in &form.scores {
            if form.selections.get(*match_id).is_none() {
                if let Some(pick) = entry.selection() {
                    form.selections.select(*match_id, pick);
                }
            }
        }

        Ok(form)
    }
}

fn parse_match_id(field: &str, id: &str) -> Result<MatchId, ApiError> {
    id.parse().map_err(|_| ApiError::InvalidField(field.to_string()))
}

pub fn submit_response(receipt: &Receipt, state: &AppState) -> SubmitResponse {
    SubmitResponse {
        participation_id: receipt.participation.id,
        folio: receipt.folio.clone(),
        jornada: receipt.participation.jornada,
        picks: receipt.picks.len(),
        payment: state.payment.clone(),
    }
}

/// POST /api/participaciones: JSON submission. Undecodable bodies get the
/// same JSON error shape as validation failures.
pub async fn create_participation(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let mut selections: Selections = req.selections.into_iter().collect();
    let contact = ContactDetails {
        nombre: req.nombre,
        telefono: req.telefono,
    };

    let snapshot = state.board.snapshot();
    let receipt = state
        .flow
        .submit(snapshot.matches(), &mut selections, &contact, Utc::now())
        .await?;

    Ok((StatusCode::CREATED, Json(submit_response(&receipt, &state))))
}
