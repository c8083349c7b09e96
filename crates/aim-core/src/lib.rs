pub mod arbiter;
pub mod config;
pub mod error;
pub mod leaderboard;
pub mod opponent;
pub mod protocol;
pub mod ranked;
pub mod rating;
pub mod reaction;
pub mod stats;

pub use arbiter::Winner;
pub use config::{EngineConfig, SettlementMode};
pub use error::MatchError;
pub use leaderboard::{Leaderboard, LeaderboardEntry, Standing};
pub use opponent::Opponent;
pub use protocol::MatchEvent;
pub use ranked::{MatchPhase, MatchResult, MatchVerdict, RankedMatch, RoundOutcome};
pub use rating::{rank_of, RankTier, Tier, MIN_RATING};
pub use stats::PlayerStats;
