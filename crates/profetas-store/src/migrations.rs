use rusqlite::Connection;
use tracing::info;

/// Same tables and column names as the hosted store, so rows decode the same
/// way from both backends. Timestamps are stored as RFC 3339 UTC strings.
pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS teams (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            logo_url    TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS matches (
            id              INTEGER PRIMARY KEY,
            home_team_id    INTEGER NOT NULL REFERENCES teams(id),
            away_team_id    INTEGER NOT NULL REFERENCES teams(id),
            home_score      INTEGER,
            away_score      INTEGER,
            start_time      TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'scheduled',
            round           INTEGER NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_matches_start_time
            ON matches(start_time);

        CREATE TABLE IF NOT EXISTS profiles (
            id              TEXT PRIMARY KEY,
            username        TEXT NOT NULL,
            total_points    INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS participaciones (
            id              TEXT PRIMARY KEY,
            nombre_completo TEXT NOT NULL,
            telefono        TEXT NOT NULL,
            jornada         INTEGER NOT NULL,
            monto_pagar     REAL NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS pronosticos_quiniela (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            participacion_id    TEXT NOT NULL REFERENCES participaciones(id) ON DELETE CASCADE,
            partido_id          INTEGER NOT NULL REFERENCES matches(id),
            seleccion           TEXT NOT NULL CHECK (seleccion IN ('L', 'E', 'V')),
            UNIQUE(participacion_id, partido_id)
        );

        CREATE INDEX IF NOT EXISTS idx_pronosticos_participacion
            ON pronosticos_quiniela(participacion_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
