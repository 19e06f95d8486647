use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use profetas_types::models::{Match, NewParticipation, Participation, Pick, Profile};

use crate::error::{Result, StoreError};
use crate::rows::decode_rows;
use crate::{Backend, migrations};

/// A SQLite file with the same tables as the hosted store.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let db = Self::init(conn)?;

        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&mut conn)
    }
}

/// [`Backend`] over a [`Database`]. Every call runs on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<Database> {
        &self.db
    }

    async fn blocking<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db)).await?
    }
}

#[async_trait]
impl Backend for SqliteStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn load_matches(&self, limit: u32) -> Result<Vec<Match>> {
        let rows = self.blocking(move |db| db.get_matches(limit)).await?;
        Ok(decode_rows(rows)?)
    }

    async fn load_profiles(&self) -> Result<Vec<Profile>> {
        let rows = self.blocking(|db| db.get_profiles()).await?;
        Ok(decode_rows(rows)?)
    }

    async fn create_participation(&self, new: &NewParticipation) -> Result<Participation> {
        let new = new.clone();
        let row = self.blocking(move |db| db.insert_participation(&new)).await?;
        Ok(Participation::try_from(row)?)
    }

    async fn create_picks(&self, picks: &[Pick]) -> Result<()> {
        if picks.is_empty() {
            return Ok(());
        }
        let picks = picks.to_vec();
        self.blocking(move |db| db.insert_picks(&picks)).await
    }

    async fn delete_participation(&self, id: Uuid) -> Result<()> {
        self.blocking(move |db| db.delete_participation(id)).await
    }
}
