use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use profetas_core::submission::SubmitError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("Campo inválido: {0}")]
    InvalidField(String),

    #[error("Solicitud inválida: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Submit(SubmitError::NoSelections | SubmitError::MissingContact) => StatusCode::BAD_REQUEST,
            ApiError::Submit(SubmitError::UnknownMatch(_) | SubmitError::MatchLocked(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Submit(SubmitError::Participation(_) | SubmitError::Picks { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::InvalidField(_) | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Submit(SubmitError::NoSelections) => "no_selections",
            ApiError::Submit(SubmitError::MissingContact) => "missing_contact",
            ApiError::Submit(SubmitError::UnknownMatch(_)) => "unknown_match",
            ApiError::Submit(SubmitError::MatchLocked(_)) => "match_locked",
            ApiError::Submit(SubmitError::Participation(_)) => "participation_failed",
            ApiError::Submit(SubmitError::Picks { .. }) => "picks_failed",
            ApiError::InvalidField(_) => "invalid_field",
            ApiError::InvalidBody(_) => "invalid_body",
        }
    }

    /// Text shown to the user. Write failures carry the store's raw message.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Submit(e) if !e.is_validation() => format!("Error al enviar: {}", e),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code(),
            "message": self.user_message(),
        }));

        (self.status(), body).into_response()
    }
}
