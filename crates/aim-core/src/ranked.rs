use serde::{Deserialize, Serialize};

use crate::arbiter::{decide, round_delta, Winner};
use crate::config::{EngineConfig, SettlementMode};
use crate::error::MatchError;
use crate::opponent::Opponent;
use crate::rating::{apply_delta, clamp_rating};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    Idle,
    Queued,
    Countdown,
    /// 1-based round currently awaiting reactions.
    InRound(u32),
    /// Round `r` finished, round `r + 1` is next.
    InterRoundPause(u32),
    Settling,
    Complete,
}

/// Ledger entry for one round. Invariant: `rating_after == rating_before + delta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub round: u32,
    pub player_ms: Option<u32>,
    pub bot_ms: Option<u32>,
    pub winner: Winner,
    pub delta: i32,
    pub rating_before: i32,
    pub rating_after: i32,
}

impl RoundOutcome {
    pub fn player_missed(&self) -> bool {
        self.player_ms.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchVerdict {
    Win,
    Loss,
    Draw,
}

impl MatchVerdict {
    /// Majority of rounds won; exactly half is a draw.
    pub fn classify(rounds_won: u32, rounds_total: u32) -> MatchVerdict {
        match (rounds_won * 2).cmp(&rounds_total) {
            std::cmp::Ordering::Greater => MatchVerdict::Win,
            std::cmp::Ordering::Less => MatchVerdict::Loss,
            std::cmp::Ordering::Equal => MatchVerdict::Draw,
        }
    }

    pub fn score(&self) -> f64 {
        match self {
            MatchVerdict::Win => 1.0,
            MatchVerdict::Draw => 0.5,
            MatchVerdict::Loss => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub opponent: Opponent,
    pub rounds: Vec<RoundOutcome>,
    pub rounds_won: u32,
    pub rating_before: i32,
    pub rating_after: i32,
}

impl MatchResult {
    pub fn verdict(&self) -> MatchVerdict {
        MatchVerdict::classify(self.rounds_won, self.rounds.len() as u32)
    }

    pub fn rating_change(&self) -> i32 {
        self.rating_after.saturating_sub(self.rating_before)
    }
}

/// Ranked match state machine. It never sleeps or draws random numbers;
/// the caller supplies the opponent and both reactions for each round.
pub struct RankedMatch {
    config: EngineConfig,
    phase: MatchPhase,
    opponent: Option<Opponent>,
    rating_before: i32,
    running_rating: i32,
    ledger: Vec<RoundOutcome>,
}

impl RankedMatch {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            phase: MatchPhase::Idle,
            opponent: None,
            rating_before: 0,
            running_rating: 0,
            ledger: Vec::new(),
        }
    }

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn opponent(&self) -> Option<&Opponent> {
        self.opponent.as_ref()
    }

    pub fn running_rating(&self) -> i32 {
        self.running_rating
    }

    pub fn ledger(&self) -> &[RoundOutcome] {
        &self.ledger
    }

    pub fn total_rounds(&self) -> u32 {
        self.config.rounds
    }

    fn invalid(&self, action: &'static str) -> MatchError {
        MatchError::InvalidTransition {
            phase: self.phase,
            action,
        }
    }

    /// Idle/Complete -> Queued. Starts a fresh ledger.
    pub fn queue(&mut self, player_rating: i32, opponent: Opponent) -> Result<(), MatchError> {
        if !matches!(self.phase, MatchPhase::Idle | MatchPhase::Complete) {
            return Err(self.invalid("queue"));
        }
        log::info!("queued vs {} (rating {})", opponent.name, opponent.rating);
        self.rating_before = clamp_rating(player_rating);
        self.running_rating = self.rating_before;
        self.opponent = Some(opponent);
        self.ledger.clear();
        self.phase = MatchPhase::Queued;
        Ok(())
    }

    /// Queued -> Countdown.
    pub fn begin_countdown(&mut self) -> Result<(), MatchError> {
        if self.phase != MatchPhase::Queued {
            return Err(self.invalid("begin countdown"));
        }
        self.phase = MatchPhase::Countdown;
        Ok(())
    }

    /// Countdown -> InRound(1). Returns the round number.
    pub fn start(&mut self) -> Result<u32, MatchError> {
        if self.phase != MatchPhase::Countdown {
            return Err(self.invalid("start"));
        }
        self.phase = MatchPhase::InRound(1);
        Ok(1)
    }

    /// Resolve the current round against the running rating and append it
    /// to the ledger. Moves to InterRoundPause, or Settling after the last round.
    pub fn play_round(
        &mut self,
        player_ms: Option<u32>,
        bot_ms: Option<u32>,
    ) -> Result<RoundOutcome, MatchError> {
        let round = match self.phase {
            MatchPhase::InRound(r) => r,
            _ => return Err(self.invalid("play a round")),
        };
        let opponent_rating = match &self.opponent {
            Some(o) => o.rating,
            None => return Err(self.invalid("play a round")),
        };

        let winner = decide(player_ms, bot_ms);
        let missed_and_lost = player_ms.is_none() && winner == Winner::Bot;
        let raw = round_delta(
            self.running_rating,
            opponent_rating,
            winner,
            self.config.k_round,
            missed_and_lost,
            self.config.miss_penalty,
        );
        let rating_before = self.running_rating;
        let rating_after = clamp_rating(rating_before.saturating_add(raw));
        let outcome = RoundOutcome {
            round,
            player_ms,
            bot_ms,
            winner,
            delta: rating_after.saturating_sub(rating_before),
            rating_before,
            rating_after,
        };
        log::debug!(
            "round {}: {:?} vs {:?} -> {:?} ({:+})",
            round,
            player_ms,
            bot_ms,
            winner,
            outcome.delta
        );

        self.running_rating = rating_after;
        self.ledger.push(outcome.clone());
        self.phase = if round >= self.config.rounds {
            MatchPhase::Settling
        } else {
            MatchPhase::InterRoundPause(round)
        };
        Ok(outcome)
    }

    /// InterRoundPause(r) -> InRound(r + 1). Returns the new round number.
    pub fn next_round(&mut self) -> Result<u32, MatchError> {
        match self.phase {
            MatchPhase::InterRoundPause(r) => {
                self.phase = MatchPhase::InRound(r + 1);
                Ok(r + 1)
            }
            _ => Err(self.invalid("advance round")),
        }
    }

    /// Settling -> Complete. Hands the ledger off and clears the opponent,
    /// so the next match needs a fresh `queue`.
    pub fn settle(&mut self) -> Result<MatchResult, MatchError> {
        if self.phase != MatchPhase::Settling {
            return Err(self.invalid("settle"));
        }
        let Some(opponent) = self.opponent.take() else {
            return Err(self.invalid("settle"));
        };
        let rounds = std::mem::take(&mut self.ledger);
        let rounds_won = rounds.iter().filter(|r| r.winner == Winner::Player).count() as u32;

        let rating_after = match self.config.settlement {
            SettlementMode::PerRound => self.running_rating,
            SettlementMode::WholeMatch => {
                let verdict = MatchVerdict::classify(rounds_won, rounds.len() as u32);
                apply_delta(
                    self.rating_before,
                    opponent.rating,
                    verdict.score(),
                    self.config.k_match,
                )
            }
        };
        self.running_rating = rating_after;
        self.phase = MatchPhase::Complete;

        log::info!(
            "match vs {} complete: {}/{} rounds, rating {} -> {}",
            opponent.name,
            rounds_won,
            rounds.len(),
            self.rating_before,
            rating_after
        );
        Ok(MatchResult {
            opponent,
            rounds,
            rounds_won,
            rating_before: self.rating_before,
            rating_after,
        })
    }

    /// Drop an unfinished match. No rating change survives it.
    pub fn abandon(&mut self) -> Vec<RoundOutcome> {
        if self.phase != MatchPhase::Idle {
            log::info!("match abandoned in {:?}", self.phase);
        }
        self.phase = MatchPhase::Idle;
        self.opponent = None;
        self.running_rating = self.rating_before;
        std::mem::take(&mut self.ledger)
    }
}
