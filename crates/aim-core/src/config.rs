use serde::{Deserialize, Serialize};

use crate::rating::{DIVISION_SPAN, GRAND_CHAMPION_THRESHOLD, MIN_RATING};

/// How the final rating of a ranked match is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementMode {
    /// The running rating after the last round is the final rating.
    #[default]
    PerRound,
    /// One update against the opponent with the match K-factor,
    /// scored by majority of rounds won.
    WholeMatch,
}

/// Engine tunables. Every field has a default, so partial JSON works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub k_match: f64,
    pub k_round: f64,
    pub rounds: u32,
    /// Multiplier on a round delta lost through a player miss.
    pub miss_penalty: f64,
    pub grand_champion_threshold: i32,
    /// Opponents are drawn uniformly within +/- this many points.
    pub opponent_spread: i32,
    pub countdown_secs: u32,
    pub countdown_go_ms: u64,
    pub round_deadline_ms: u64,
    pub inter_round_pause_ms: u64,
    pub practice_pause_ms: u64,
    pub leaderboard_capacity: usize,
    pub drift_interval_ms: u64,
    pub settlement: SettlementMode,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            k_match: 32.0,
            k_round: 20.0,
            rounds: 3,
            miss_penalty: 1.5,
            grand_champion_threshold: GRAND_CHAMPION_THRESHOLD,
            opponent_spread: 150,
            countdown_secs: 3,
            countdown_go_ms: 500,
            round_deadline_ms: 5000,
            inter_round_pause_ms: 900,
            practice_pause_ms: 350,
            leaderboard_capacity: 50,
            drift_interval_ms: 5 * 60 * 1000,
            settlement: SettlementMode::PerRound,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Replace values that would break the engine's invariants.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.rounds == 0 {
            log::warn!("rounds must be at least 1, using {}", defaults.rounds);
            self.rounds = defaults.rounds;
        }
        if self.leaderboard_capacity == 0 {
            self.leaderboard_capacity = defaults.leaderboard_capacity;
        }
        if !self.k_round.is_finite() || self.k_round < 0.0 {
            self.k_round = defaults.k_round;
        }
        if !self.k_match.is_finite() || self.k_match < 0.0 {
            self.k_match = defaults.k_match;
        }
        if !self.miss_penalty.is_finite() || self.miss_penalty < 1.0 {
            self.miss_penalty = defaults.miss_penalty;
        }
        self.opponent_spread = self.opponent_spread.max(0);
        let lowest_ceiling = MIN_RATING + DIVISION_SPAN;
        if self.grand_champion_threshold < lowest_ceiling {
            log::warn!(
                "grand_champion_threshold {} is below {}, raising it",
                self.grand_champion_threshold,
                lowest_ceiling
            );
            self.grand_champion_threshold = lowest_ceiling;
        }
        self
    }
}
