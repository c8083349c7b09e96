use serde::{Deserialize, Serialize};

use crate::leaderboard::LeaderboardEntry;
use crate::opponent::Opponent;
use crate::ranked::{MatchResult, RoundOutcome};
use crate::rating::{rank_with_ceiling, RankTier};
use crate::stats::PlayerStats;

/// Progress notifications for whatever renders a match or practice run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchEvent {
    Queued {
        opponent: Opponent,
    },
    /// Seconds left before the first round; 0 means "GO".
    Countdown {
        remaining: u32,
    },
    RoundStarted {
        round: u32,
        total: u32,
        /// Milliseconds the player has to react.
        deadline_ms: u64,
    },
    RoundFinished {
        outcome: RoundOutcome,
    },
    Completed {
        result: MatchResult,
    },
    Abandoned {
        rounds_played: u32,
    },
    PracticeTarget,
    PracticeHit {
        reaction_ms: u32,
    },
    PracticeMiss,
    PracticeEnded {
        hits: u32,
        misses: u32,
    },
}

/// Profile card for the live player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub rating: i32,
    pub rank: RankTier,
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub rounds_played: u32,
    pub average_reaction_ms: Option<u32>,
    pub best_reaction_ms: Option<u32>,
}

impl PlayerProfile {
    pub fn new(rating: i32, stats: &PlayerStats, ceiling: i32) -> Self {
        Self {
            rating,
            rank: rank_with_ceiling(rating, ceiling),
            games_played: stats.games_played,
            wins: stats.wins,
            losses: stats.losses,
            rounds_played: stats.total_rounds,
            average_reaction_ms: stats.average_reaction(),
            best_reaction_ms: stats.best_reaction,
        }
    }
}

/// Profile card for a leaderboard bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotProfile {
    pub name: String,
    pub rating: i32,
    pub rank: RankTier,
    pub games_played: u32,
    pub wins: u32,
    pub average_reaction_ms: u32,
}

impl BotProfile {
    pub fn new(entry: &LeaderboardEntry, ceiling: i32) -> Self {
        Self {
            name: entry.name.clone(),
            rating: entry.rating,
            rank: rank_with_ceiling(entry.rating, ceiling),
            games_played: entry.games_played,
            wins: entry.wins,
            average_reaction_ms: entry.average_reaction_ms,
        }
    }
}
