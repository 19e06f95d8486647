use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use profetas_types::api::{MatchBoardResponse, MatchView};
use profetas_types::models::{Match, MatchId};

use crate::loader::MatchLoader;
use crate::lock::match_locked;

/// Loaded matches plus the lock state computed for them at `evaluated_at`.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    matches: Vec<Match>,
    locked: HashSet<MatchId>,
    evaluated_at: Option<DateTime<Utc>>,
}

impl BoardSnapshot {
    pub fn evaluate(matches: Vec<Match>, now: DateTime<Utc>) -> Self {
        let locked = matches
            .iter()
            .filter(|m| match_locked(m, now))
            .map(|m| m.id)
            .collect();
        Self {
            matches,
            locked,
            evaluated_at: Some(now),
        }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn is_locked(&self, id: MatchId) -> bool {
        self.locked.contains(&id)
    }

    pub fn evaluated_at(&self) -> Option<DateTime<Utc>> {
        self.evaluated_at
    }

    pub fn round(&self) -> Option<u32> {
        self.matches.first().map(|m| m.round)
    }

    pub fn views(&self) -> Vec<MatchView> {
        self.matches
            .iter()
            .map(|m| MatchView {
                details: m.clone(),
                locked: self.is_locked(m.id),
            })
            .collect()
    }

    pub fn to_response(&self) -> MatchBoardResponse {
        MatchBoardResponse {
            round: self.round(),
            evaluated_at: self.evaluated_at,
            matches: self.views(),
        }
    }
}

/// Shared, periodically refreshed view of the match list.
#[derive(Clone)]
pub struct MatchBoard {
    tx: Arc<watch::Sender<Arc<BoardSnapshot>>>,
}

impl Default for MatchBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchBoard {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(BoardSnapshot::default()));
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Arc<BoardSnapshot> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardSnapshot>> {
        self.tx.subscribe()
    }

    pub fn publish(&self, snapshot: BoardSnapshot) -> Arc<BoardSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(snapshot.clone());
        snapshot
    }

    /// Reload the matches and recompute every lock against the current time.
    pub async fn refresh(&self, loader: &MatchLoader) -> Arc<BoardSnapshot> {
        let matches = loader.load().await;
        let snapshot = BoardSnapshot::evaluate(matches, Utc::now());
        debug!(
            "Match board refreshed: {} matches, {} locked",
            snapshot.matches.len(),
            snapshot.locked.len()
        );
        self.publish(snapshot)
    }
}

/// Refresh `board` right away and then every `period` until `cancel` fires.
/// Cancelling also abandons a load that is still in flight.
pub async fn run_refresh_loop(
    board: MatchBoard,
    loader: MatchLoader,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = board.refresh(&loader) => {}
        }
    }

    info!("Match board refresh stopped");
}

#[cfg(test)]
mod tests {
    use profetas_store::MemoryBackend;
    use profetas_store::memory::Call;
    use profetas_types::models::MatchStatus;

    use super::*;
    use crate::fixtures::{fixture, hours_from_now};

    #[test]
    fn snapshot_locks_started_and_live_matches() {
        let snapshot = BoardSnapshot::evaluate(
            vec![
                fixture(1, hours_from_now(3), MatchStatus::Scheduled),
                fixture(2, hours_from_now(3), MatchStatus::Live),
                fixture(3, hours_from_now(-1), MatchStatus::Scheduled),
            ],
            Utc::now(),
        );

        assert!(!snapshot.is_locked(1));
        assert!(snapshot.is_locked(2));
        assert!(snapshot.is_locked(3));
        assert_eq!(snapshot.round(), Some(9));

        let views = snapshot.views();
        assert_eq!(views.iter().filter(|v| v.locked).count(), 2);
    }

    #[tokio::test]
    async fn refresh_publishes_to_subscribers() {
        let backend = Arc::new(MemoryBackend::new().with_matches(vec![fixture(
            4,
            hours_from_now(2),
            MatchStatus::Scheduled,
        )]));
        let loader = MatchLoader::new(backend, 20);
        let board = MatchBoard::new();
        let mut rx = board.subscribe();

        board.refresh(&loader).await;

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.matches().len(), 1);
        assert!(snapshot.evaluated_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_refreshes_immediately_then_on_interval_until_cancelled() {
        let backend = Arc::new(MemoryBackend::new());
        let loader = MatchLoader::new(backend.clone(), 20);
        let board = MatchBoard::new();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_refresh_loop(
            board.clone(),
            loader,
            Duration::from_secs(60),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(backend.calls().len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.calls().len(), 2);
        assert!(backend.calls().iter().all(|c| *c == Call::LoadMatches { limit: 20 }));

        cancel.cancel();
        task.await.unwrap();

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn next_tick_picks_up_external_status_change() {
        let kickoff = hours_from_now(2);
        let backend = Arc::new(MemoryBackend::new().with_matches(vec![fixture(
            7,
            kickoff,
            MatchStatus::Scheduled,
        )]));
        let loader = MatchLoader::new(backend.clone(), 20);
        let board = MatchBoard::new();
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_refresh_loop(
            board.clone(),
            loader,
            Duration::from_secs(60),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        let before = board.snapshot();
        assert_eq!(before.matches().len(), 1);
        assert!(!before.is_locked(7));

        backend.set_matches(vec![fixture(7, kickoff, MatchStatus::Live)]);
        tokio::time::sleep(Duration::from_secs(60)).await;

        let after = board.snapshot();
        assert!(after.is_locked(7));
        assert_eq!(after.matches()[0].status, MatchStatus::Live);

        cancel.cancel();
        task.await.unwrap();
    }
}
