//! Gateway to the table store holding teams, matches, profiles and
//! participations.
//!
//! Everything above this crate talks to an `Arc<dyn Backend>`; which store is
//! behind it is decided once at startup.

pub mod error;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod rest;
pub mod rows;
pub mod sqlite;

use async_trait::async_trait;
use uuid::Uuid;

use profetas_types::models::{Match, NewParticipation, Participation, Pick, Profile};

pub use error::{DecodeError, Result, StoreError};
pub use memory::MemoryBackend;
pub use rest::RestBackend;
pub use sqlite::{Database, SqliteStore};

#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Up to `limit` matches with both teams expanded, most recent start time first.
    async fn load_matches(&self, limit: u32) -> Result<Vec<Match>>;

    /// All profiles, in whatever order the store returns them.
    async fn load_profiles(&self) -> Result<Vec<Profile>>;

    /// Insert a participation and return it with its generated id.
    async fn create_participation(&self, new: &NewParticipation) -> Result<Participation>;

    /// Insert a batch of picks. An empty batch is a no-op.
    async fn create_picks(&self, picks: &[Pick]) -> Result<()>;

    async fn delete_participation(&self, id: Uuid) -> Result<()>;
}
