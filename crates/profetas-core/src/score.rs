use std::cmp::Ordering;

use profetas_types::models::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("score must be a whole number")]
pub struct InvalidScore;

/// Parse a score box: empty means no score yet, otherwise digits only.
pub fn parse_score(value: &str) -> Result<Option<u32>, InvalidScore> {
    if value.is_empty() {
        return Ok(None);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidScore);
    }
    value.parse().map(Some).map_err(|_| InvalidScore)
}

/// The two score boxes of a match card.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreEntry {
    home: String,
    away: String,
}

impl ScoreEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false and keeps the previous value when `value` is not a score.
    pub fn set_home(&mut self, value: &str) -> bool {
        Self::set(&mut self.home, value)
    }

    pub fn set_away(&mut self, value: &str) -> bool {
        Self::set(&mut self.away, value)
    }

    fn set(slot: &mut String, value: &str) -> bool {
        if parse_score(value).is_err() {
            return false;
        }
        *slot = value.to_string();
        true
    }

    pub fn home(&self) -> &str {
        &self.home
    }

    pub fn away(&self) -> &str {
        &self.away
    }

    pub fn prediction(&self) -> (Option<u32>, Option<u32>) {
        (
            parse_score(&self.home).ok().flatten(),
            parse_score(&self.away).ok().flatten(),
        )
    }

    /// Outcome implied by a complete score, if both sides are filled in.
    pub fn selection(&self) -> Option<Selection> {
        match self.prediction() {
            (Some(home), Some(away)) => Some(outcome(home, away)),
            _ => None,
        }
    }
}

pub fn outcome(home: u32, away: u32) -> Selection {
    match home.cmp(&away) {
        Ordering::Greater => Selection::Local,
        Ordering::Equal => Selection::Empate,
        Ordering::Less => Selection::Visita,
    }
}

/// What a score box shows: the final score once the match is locked and a
/// result is known, otherwise whatever the user typed.
pub fn display_score(locked: bool, final_score: Option<u32>, input: &str) -> String {
    match final_score {
        Some(score) if locked => score.to_string(),
        _ => input.to_string(),
    }
}
