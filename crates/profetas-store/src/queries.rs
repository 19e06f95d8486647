use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use profetas_types::models::{Match, NewParticipation, Pick, Profile, Team};

use crate::Database;
use crate::error::{DecodeError, Result, StoreError};
use crate::rows::{MatchRow, ParticipationRow, ProfileRow, TeamRow};

impl Database {
    // -- Matches --

    pub fn get_matches(&self, limit: u32) -> Result<Vec<MatchRow>> {
        self.with_conn(|conn| query_matches(conn, limit))
    }

    /// Insert or replace a match together with both of its teams. Matches are
    /// normally written by the fixture sync; this is for seeding a local file.
    pub fn upsert_match(&self, m: &Match) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            upsert_team(&tx, &m.home_team)?;
            upsert_team(&tx, &m.away_team)?;
            tx.execute(
                "INSERT INTO matches (id, home_team_id, away_team_id, home_score, away_score, start_time, status, round)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    home_team_id = excluded.home_team_id,
                    away_team_id = excluded.away_team_id,
                    home_score = excluded.home_score,
                    away_score = excluded.away_score,
                    start_time = excluded.start_time,
                    status = excluded.status,
                    round = excluded.round",
                rusqlite::params![
                    m.id,
                    m.home_team.id,
                    m.away_team.id,
                    m.home_score,
                    m.away_score,
                    m.start_time.to_rfc3339_opts(SecondsFormat::Secs, true),
                    m.status.as_str(),
                    m.round,
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    // -- Profiles --

    pub fn get_profiles(&self) -> Result<Vec<ProfileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, username, total_points, created_at FROM profiles ORDER BY rowid",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ProfileRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        total_points: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn upsert_profile(&self, profile: &Profile) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO profiles (id, username, total_points) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET username = excluded.username, total_points = excluded.total_points",
                rusqlite::params![profile.id.to_string(), profile.username, profile.total_points],
            )?;
            Ok(())
        })
    }

    // -- Participations --

    /// The store assigns the id and creation time, like the hosted table does.
    pub fn insert_participation(&self, new: &NewParticipation) -> Result<ParticipationRow> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO participaciones (id, nombre_completo, telefono, jornada, monto_pagar, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, new.nombre_completo, new.telefono, new.jornada, new.monto_pagar, created_at],
            )?;

            conn.query_row(
                "SELECT id, nombre_completo, telefono, jornada, monto_pagar, created_at
                 FROM participaciones WHERE id = ?1",
                [&id],
                participation_row,
            )
            .optional()?
            .ok_or_else(|| DecodeError::EmptyInsert { table: "participaciones" }.into())
        })
    }

    pub fn delete_participation(&self, id: Uuid) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM participaciones WHERE id = ?1", [id.to_string()])?;
            Ok(())
        })
    }

    pub fn get_participation_ids(&self) -> Result<Vec<Uuid>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id FROM participaciones ORDER BY rowid")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            ids.iter()
                .map(|id| {
                    id.parse::<Uuid>().map_err(|_| {
                        StoreError::from(DecodeError::InvalidId {
                            table: "participaciones",
                            value: id.clone(),
                        })
                    })
                })
                .collect()
        })
    }

    // -- Picks --

    /// Insert a pick batch in one transaction: either every pick lands or none.
    pub fn insert_picks(&self, picks: &[Pick]) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO pronosticos_quiniela (participacion_id, partido_id, seleccion) VALUES (?1, ?2, ?3)",
                )?;
                for pick in picks {
                    stmt.execute(rusqlite::params![
                        pick.participacion_id.to_string(),
                        pick.partido_id,
                        pick.seleccion.code(),
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_picks_for(&self, participation_id: Uuid) -> Result<Vec<Pick>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT partido_id, seleccion FROM pronosticos_quiniela
                 WHERE participacion_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([participation_id.to_string()], |row| {
                    Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(partido_id, code)| -> Result<Pick> {
                    let seleccion = code
                        .parse()
                        .map_err(|_| DecodeError::UnknownSelection(code.clone()))?;
                    Ok(Pick {
                        participacion_id: participation_id,
                        partido_id,
                        seleccion,
                    })
                })
                .collect()
        })
    }
}

fn upsert_team(conn: &Connection, team: &Team) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO teams (id, name, logo_url) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET name = excluded.name, logo_url = excluded.logo_url",
        rusqlite::params![team.id, team.name, team.logo_url],
    )?;
    Ok(())
}

fn query_matches(conn: &Connection, limit: u32) -> Result<Vec<MatchRow>> {
    // LEFT JOIN so a dangling team reference surfaces as a decode error
    // instead of silently dropping the match.
    let mut stmt = conn.prepare(
        "SELECT m.id, m.start_time, m.status, m.round, m.home_score, m.away_score,
                h.id, h.name, h.logo_url,
                a.id, a.name, a.logo_url
         FROM matches m
         LEFT JOIN teams h ON m.home_team_id = h.id
         LEFT JOIN teams a ON m.away_team_id = a.id
         ORDER BY m.start_time DESC
         LIMIT ?1",
    )?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(MatchRow {
                id: row.get(0)?,
                start_time: row.get(1)?,
                status: row.get(2)?,
                round: row.get(3)?,
                home_score: row.get(4)?,
                away_score: row.get(5)?,
                home_team: team_row(row, 6)?,
                away_team: team_row(row, 9)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn team_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Option<TeamRow>> {
    let Some(id) = row.get::<_, Option<i64>>(offset)? else {
        return Ok(None);
    };
    Ok(Some(TeamRow {
        id,
        name: row.get(offset + 1)?,
        logo_url: row.get(offset + 2)?,
    }))
}

fn participation_row(row: &Row<'_>) -> rusqlite::Result<ParticipationRow> {
    Ok(ParticipationRow {
        id: row.get(0)?,
        nombre_completo: row.get(1)?,
        telefono: row.get(2)?,
        jornada: row.get(3)?,
        monto_pagar: row.get(4)?,
        created_at: row.get(5)?,
    })
}
