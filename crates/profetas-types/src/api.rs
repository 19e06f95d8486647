use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Match, MatchId, Selection};

// -- Matches --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub details: Match,
    pub locked: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchBoardResponse {
    /// Round shown in the page header, taken from the first loaded match.
    pub round: Option<u32>,
    pub evaluated_at: Option<DateTime<Utc>>,
    pub matches: Vec<MatchView>,
}

// -- Submission --

/// Missing fields decode as empty so they are reported by submission
/// validation rather than by the decoder.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitRequest {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub telefono: String,
    #[serde(default)]
    pub selections: BTreeMap<MatchId, Selection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub amount: String,
    pub bank: String,
    pub account: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub participation_id: Uuid,
    pub folio: String,
    pub jornada: u32,
    pub picks: usize,
    pub payment: PaymentInfo,
}

// -- Ranking --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

impl Medal {
    pub fn for_position(position: usize) -> Option<Self> {
        match position {
            1 => Some(Self::Gold),
            2 => Some(Self::Silver),
            3 => Some(Self::Bronze),
            _ => None,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Gold => "🥇",
            Self::Silver => "🥈",
            Self::Bronze => "🥉",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingRow {
    pub position: usize,
    pub medal: Option<Medal>,
    pub profile_id: Uuid,
    pub username: String,
    pub total_points: i64,
}
