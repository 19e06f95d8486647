use std::sync::Arc;

use tracing::{debug, error};

use profetas_store::Backend;
use profetas_types::api::RankingRow;
use profetas_types::models::Match;

use crate::ranking::rank_profiles;

pub const DEFAULT_MATCH_LIMIT: u32 = 20;

/// Round used for a participation when no match is loaded.
pub const DEFAULT_ROUND: u32 = 1;

/// Reads the match list and the leaderboard. Load failures never reach the
/// user: they are logged and the result is empty.
#[derive(Clone)]
pub struct MatchLoader {
    backend: Arc<dyn Backend>,
    limit: u32,
}

impl MatchLoader {
    pub fn new(backend: Arc<dyn Backend>, limit: u32) -> Self {
        Self { backend, limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub async fn load(&self) -> Vec<Match> {
        match self.backend.load_matches(self.limit).await {
            Ok(matches) => {
                debug!("Loaded {} matches from {}", matches.len(), self.backend.name());
                matches
            }
            Err(e) => {
                error!("Error loading matches from {}: {}", self.backend.name(), e);
                Vec::new()
            }
        }
    }

    pub async fn load_ranking(&self) -> Vec<RankingRow> {
        match self.backend.load_profiles().await {
            Ok(profiles) => rank_profiles(profiles),
            Err(e) => {
                error!("Error loading profiles from {}: {}", self.backend.name(), e);
                Vec::new()
            }
        }
    }
}

/// Round of the first loaded match, or [`DEFAULT_ROUND`].
pub fn current_round(matches: &[Match]) -> u32 {
    matches.first().map(|m| m.round).unwrap_or(DEFAULT_ROUND)
}
