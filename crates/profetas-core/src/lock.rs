use std::time::Duration;

use chrono::{DateTime, Utc};

use profetas_types::models::{Match, MatchStatus};

/// How often lock state is recomputed. Nothing notifies us when a match
/// starts, so it is polled.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Picks on a match can no longer change once it has kicked off or the feed
/// reports it live or finished, whichever comes first.
pub fn is_locked(start_time: DateTime<Utc>, status: MatchStatus, now: DateTime<Utc>) -> bool {
    now >= start_time || matches!(status, MatchStatus::Live | MatchStatus::Finished)
}

pub fn match_locked(m: &Match, now: DateTime<Utc>) -> bool {
    is_locked(m.start_time, m.status, now)
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;

    const ALL_STATUSES: [MatchStatus; 3] = [MatchStatus::Scheduled, MatchStatus::Live, MatchStatus::Finished];

    fn kickoff() -> DateTime<Utc> {
        "2025-10-04T02:05:00Z".parse().unwrap()
    }

    #[test]
    fn locked_once_start_time_reached_regardless_of_status() {
        for status in ALL_STATUSES {
            assert!(is_locked(kickoff(), status, kickoff()), "{status} at kickoff");
            assert!(
                is_locked(kickoff(), status, kickoff() + ChronoDuration::hours(3)),
                "{status} after kickoff"
            );
        }
    }

    #[test]
    fn live_or_finished_locked_regardless_of_time() {
        let early = kickoff() - ChronoDuration::days(2);
        assert!(is_locked(kickoff(), MatchStatus::Live, early));
        assert!(is_locked(kickoff(), MatchStatus::Finished, early));
    }

    #[test]
    fn scheduled_before_start_is_open() {
        let one_second_before = kickoff() - ChronoDuration::seconds(1);
        assert!(!is_locked(kickoff(), MatchStatus::Scheduled, one_second_before));
        assert!(!is_locked(kickoff(), MatchStatus::Scheduled, kickoff() - ChronoDuration::days(7)));
    }
}
