use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MatchId = i64;
pub type TeamId = i64;

/// Amount due for every participation, in MXN.
pub const ENTRY_FEE: f64 = 15.00;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub logo_url: Option<String>,
}

impl Team {
    /// Initial shown in place of a missing logo.
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Live => "live",
            Self::Finished => "finished",
        }
    }

    /// Badge text shown on the match card.
    pub fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Programado",
            Self::Live => "En Vivo",
            Self::Finished => "Finalizado",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value {:?}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

impl FromStr for MatchStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "live" => Ok(Self::Live),
            "finished" => Ok(Self::Finished),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A match with both teams expanded, as loaded for the quiniela page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub home_team: Team,
    pub away_team: Team,
    pub start_time: DateTime<Utc>,
    pub status: MatchStatus,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub round: u32,
}

/// One of the three outcomes a participant can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Selection {
    #[serde(rename = "L")]
    Local,
    #[serde(rename = "E")]
    Empate,
    #[serde(rename = "V")]
    Visita,
}

impl Selection {
    pub const ALL: [Selection; 3] = [Selection::Local, Selection::Empate, Selection::Visita];

    /// Single-letter code stored in `pronosticos_quiniela.seleccion`.
    pub fn code(self) -> &'static str {
        match self {
            Self::Local => "L",
            Self::Empate => "E",
            Self::Visita => "V",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "LOCAL",
            Self::Empate => "EMPATE",
            Self::Visita => "VISITA",
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Selection {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Self::Local),
            "E" => Ok(Self::Empate),
            "V" => Ok(Self::Visita),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Fields sent when creating a participation. The id and timestamp are
/// assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewParticipation {
    pub nombre_completo: String,
    pub telefono: String,
    pub jornada: u32,
    pub monto_pagar: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: Uuid,
    pub nombre_completo: String,
    pub telefono: String,
    pub jornada: u32,
    pub monto_pagar: f64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Participation {
    /// Short reference code handed to the participant.
    pub fn folio(&self) -> String {
        self.id.to_string().chars().take(8).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pick {
    pub participacion_id: Uuid,
    pub partido_id: MatchId,
    pub seleccion: Selection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub total_points: i64,
    pub created_at: Option<DateTime<Utc>>,
}
