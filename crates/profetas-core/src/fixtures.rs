use chrono::{DateTime, Duration, Utc};

use profetas_types::models::{Match, MatchId, MatchStatus, Team};

pub fn hours_from_now(hours: i64) -> DateTime<Utc> {
    Utc::now() + Duration::hours(hours)
}

pub fn fixture(id: MatchId, start_time: DateTime<Utc>, status: MatchStatus) -> Match {
    Match {
        id,
        home_team: Team {
            id: 7807,
            name: "Club América".into(),
            logo_url: None,
        },
        away_team: Team {
            id: 6576,
            name: "Tigres".into(),
            logo_url: Some("https://images.example/tigres.png".into()),
        },
        start_time,
        status,
        home_score: None,
        away_score: None,
        round: 9,
    }
}
