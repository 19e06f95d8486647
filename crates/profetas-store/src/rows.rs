//! Wire rows as the store returns them, and their validated conversion into
//! the models in `profetas_types`.
//!
//! Both the REST and the SQLite backends produce these rows, so every match or
//! profile goes through the same checks regardless of where it came from.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use profetas_types::models::{Match, MatchStatus, Participation, Profile, Team};

use crate::error::DecodeError;

#[derive(Debug, Clone, Deserialize)]
pub struct TeamRow {
    pub id: i64,
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRow {
    pub id: i64,
    pub start_time: String,
    pub status: String,
    pub round: i64,
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub home_team: Option<TeamRow>,
    pub away_team: Option<TeamRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub username: String,
    pub total_points: i64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipationRow {
    pub id: String,
    pub nombre_completo: String,
    pub telefono: String,
    pub jornada: i64,
    pub monto_pagar: f64,
    pub created_at: Option<String>,
}

/// Parse a JSON body into `T`, tagging failures with the table they came from.
pub fn decode_json<T: DeserializeOwned>(table: &'static str, body: &str) -> Result<T, DecodeError> {
    serde_json::from_str(body).map_err(|source| DecodeError::Json { table, source })
}

/// Accepts RFC 3339 timestamps and the two naive forms the stores emit
/// (`YYYY-MM-DD HH:MM:SS` from SQLite, `YYYY-MM-DDTHH:MM:SS[.f]` from
/// `timestamp` columns). Naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|ndt| ndt.and_utc()))
        .map_err(|_| DecodeError::Timestamp {
            value: value.to_string(),
        })
}

fn parse_uuid(table: &'static str, value: &str) -> Result<Uuid, DecodeError> {
    value.parse().map_err(|_| DecodeError::InvalidId {
        table,
        value: value.to_string(),
    })
}

fn non_negative(table: &'static str, field: &'static str, value: i64) -> Result<u32, DecodeError> {
    u32::try_from(value).map_err(|_| DecodeError::OutOfRange { table, field, value })
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            logo_url: row.logo_url.filter(|url| !url.is_empty()),
        }
    }
}

impl TryFrom<MatchRow> for Match {
    type Error = DecodeError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let status: MatchStatus = row
            .status
            .parse()
            .map_err(|_| DecodeError::UnknownStatus(row.status.clone()))?;
        let home_team = row.home_team.ok_or(DecodeError::MissingTeam {
            match_id: row.id,
            side: "home",
        })?;
        let away_team = row.away_team.ok_or(DecodeError::MissingTeam {
            match_id: row.id,
            side: "away",
        })?;

        Ok(Self {
            id: row.id,
            home_team: home_team.into(),
            away_team: away_team.into(),
            start_time: parse_timestamp(&row.start_time)?,
            status,
            home_score: row
                .home_score
                .map(|score| non_negative("matches", "home_score", score))
                .transpose()?,
            away_score: row
                .away_score
                .map(|score| non_negative("matches", "away_score", score))
                .transpose()?,
            round: non_negative("matches", "round", row.round)?,
        })
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = DecodeError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid("profiles", &row.id)?,
            username: row.username,
            total_points: row.total_points,
            created_at: row.created_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

impl TryFrom<ParticipationRow> for Participation {
    type Error = DecodeError;

    fn try_from(row: ParticipationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid("participaciones", &row.id)?,
            nombre_completo: row.nombre_completo,
            telefono: row.telefono,
            jornada: non_negative("participaciones", "jornada", row.jornada)?,
            monto_pagar: row.monto_pagar,
            created_at: row.created_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// Decode a list of rows, failing on the first invalid one.
pub fn decode_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, DecodeError>
where
    T: TryFrom<R, Error = DecodeError>,
{
    rows.into_iter().map(T::try_from).collect()
}
