use serde::{Deserialize, Serialize};

use crate::rating::expected_score;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Player,
    Bot,
    Draw,
}

impl Winner {
    /// Score from the player's side.
    pub fn score(&self) -> f64 {
        match self {
            Winner::Player => 1.0,
            Winner::Draw => 0.5,
            Winner::Bot => 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Winner::Player => "PLAYER",
            Winner::Bot => "BOT",
            Winner::Draw => "DRAW",
        }
    }
}

/// Decide a round from both reactions. `None` is a miss.
pub fn decide(player_ms: Option<u32>, bot_ms: Option<u32>) -> Winner {
    match (player_ms, bot_ms) {
        (None, None) => Winner::Draw,
        (None, Some(_)) => Winner::Bot,
        (Some(_), None) => Winner::Player,
        (Some(p), Some(b)) if p < b => Winner::Player,
        (Some(p), Some(b)) if p > b => Winner::Bot,
        _ => Winner::Draw,
    }
}

/// Rating delta for one round, before the floor is applied.
/// A loss through a player miss is scaled by `miss_penalty` ahead of rounding.
pub fn round_delta(
    rating_before: i32,
    opponent_rating: i32,
    winner: Winner,
    k_round: f64,
    player_missed_and_lost: bool,
    miss_penalty: f64,
) -> i32 {
    let mut raw = k_round * (winner.score() - expected_score(rating_before, opponent_rating));
    if player_missed_and_lost {
        raw *= miss_penalty;
    }
    raw.round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decide_table() {
        assert_eq!(decide(None, None), Winner::Draw);
        assert_eq!(decide(Some(100), None), Winner::Player);
        assert_eq!(decide(None, Some(100)), Winner::Bot);
        assert_eq!(decide(Some(150), Some(100)), Winner::Bot);
        assert_eq!(decide(Some(100), Some(150)), Winner::Player);
        assert_eq!(decide(Some(100), Some(100)), Winner::Draw);
    }

    #[test]
    fn win_between_equals() {
        assert_eq!(round_delta(1000, 1000, Winner::Player, 20.0, false, 1.5), 10);
        assert_eq!(round_delta(1000, 1000, Winner::Draw, 20.0, false, 1.5), 0);
        assert_eq!(round_delta(1000, 1000, Winner::Bot, 20.0, false, 1.5), -10);
    }

    #[test]
    fn miss_loss_is_amplified() {
        let slow = round_delta(1500, 1500, Winner::Bot, 20.0, false, 1.5);
        let missed = round_delta(1500, 1500, Winner::Bot, 20.0, true, 1.5);
        assert_eq!(slow, -10);
        assert_eq!(missed, -15);
    }

    #[test]
    fn amplification_rounds_once() {
        // 20 * (0 - E(1500, 1540)) = -8.85..., times 1.5 = -13.28
        let delta = round_delta(1500, 1540, Winner::Bot, 20.0, true, 1.5);
        assert_eq!(delta, -13);
    }
}
