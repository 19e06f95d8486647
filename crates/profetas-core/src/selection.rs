use std::collections::BTreeMap;

use profetas_types::models::{MatchId, Selection};

/// Picks made so far, one per match. A pick can be changed but not cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selections {
    picks: BTreeMap<MatchId, Selection>,
}

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pick for `match_id`, replacing any earlier one.
    pub fn select(&mut self, match_id: MatchId, pick: Selection) {
        self.picks.insert(match_id, pick);
    }

    pub fn get(&self, match_id: MatchId) -> Option<Selection> {
        self.picks.get(&match_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// Picks in match id order.
    pub fn iter(&self) -> impl Iterator<Item = (MatchId, Selection)> + '_ {
        self.picks.iter().map(|(id, pick)| (*id, *pick))
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }
}

impl FromIterator<(MatchId, Selection)> for Selections {
    fn from_iter<I: IntoIterator<Item = (MatchId, Selection)>>(iter: I) -> Self {
        let mut selections = Self::new();
        for (match_id, pick) in iter {
            selections.select(match_id, pick);
        }
        selections
    }
}
