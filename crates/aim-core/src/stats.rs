use serde::{Deserialize, Serialize};

use crate::ranked::{MatchResult, MatchVerdict};

/// Aggregate counters for the live player. Only ever appended to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerStats {
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub total_rounds: u32,
    pub total_reaction: u64,
    pub best_reaction: Option<u32>,
}

impl PlayerStats {
    /// Count one timed hit.
    pub fn record_reaction(&mut self, ms: u32) {
        self.total_reaction += ms as u64;
        self.total_rounds += 1;
        self.best_reaction = Some(self.best_reaction.map_or(ms, |best| best.min(ms)));
    }

    /// Fold a finished ranked match in. Only rounds with a timed hit
    /// contribute to the reaction totals.
    pub fn record_match(&mut self, result: &MatchResult) {
        self.games_played += 1;
        match result.verdict() {
            MatchVerdict::Win => self.wins += 1,
            MatchVerdict::Loss => self.losses += 1,
            MatchVerdict::Draw => {}
        }
        for ms in result.rounds.iter().filter_map(|r| r.player_ms) {
            self.record_reaction(ms);
        }
    }

    pub fn average_reaction(&self) -> Option<u32> {
        if self.total_rounds == 0 {
            return None;
        }
        Some((self.total_reaction as f64 / self.total_rounds as f64).round() as u32)
    }
}
